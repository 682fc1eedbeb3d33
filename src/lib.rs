pub mod bms;
pub mod config;
pub mod game;
pub mod traits;
pub mod util;

#[cfg(test)]
mod test_utils;
