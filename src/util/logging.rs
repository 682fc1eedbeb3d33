use env_logger::{Builder, Env};

/// Initialize the logging system with env_logger.
///
/// `RUST_LOG` takes precedence. Otherwise the `verbose` flag controls whether
/// debug logs from this crate are shown.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "brs_play=debug,warn"
    } else {
        "brs_play=info,warn"
    };

    // A second call (tests, embedding) is not an error.
    let _ = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_target(true)
        .try_init();
}
