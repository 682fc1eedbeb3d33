mod channel;
mod chart;
mod compiler;
mod error;
mod lane_remap;
mod parser;
mod timing;

use std::path::Path;

use anyhow::Result;

pub use channel::*;
pub use chart::*;
pub use compiler::*;
pub use error::*;
pub use lane_remap::*;
pub use parser::*;
pub use timing::*;

/// Read a BMS file with automatic encoding detection (UTF-8 or Shift-JIS)
pub fn read_bms_file<P: AsRef<Path>>(path: P) -> Result<String, BmsError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| BmsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    // Try UTF-8 first
    let bytes = match String::from_utf8(bytes) {
        Ok(content) => return Ok(content),
        Err(err) => err.into_bytes(),
    };

    // Fall back to Shift-JIS
    let (content, _, had_errors) = encoding_rs::SHIFT_JIS.decode(&bytes);
    if had_errors {
        return Err(BmsError::Decode {
            path: path.to_path_buf(),
        });
    }

    log::debug!("decoded {} as Shift-JIS", path.display());
    Ok(content.into_owned())
}

/// Read, parse and compile a chart file.
pub fn load_chart<P: AsRef<Path>>(path: P) -> Result<Chart> {
    let source = read_bms_file(path)?;
    Ok(compile(&parse_chart(&source)))
}
