use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BmsError {
    #[error("Failed to read BMS file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode BMS file as UTF-8 or Shift-JIS: {path}")]
    Decode { path: PathBuf },
}
