mod play_config;

pub use play_config::PlayConfig;
