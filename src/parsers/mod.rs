//! Vendor-specific logger parsers.
//!
//! Each parser is tailored to a single vendor export and returns the same
//! [`ParsedLoggerData`] shape. [`LoggerFormat`] is the closed set of
//! supported formats, so callers can pick a parser by value.
//!
//! ```no_run
//! use microclimate_readers::config::HoboConfig;
//! use microclimate_readers::parsers::LoggerFormat;
//!
//! # fn example() -> microclimate_readers::Result<()> {
//! let format = LoggerFormat::Hobo(HoboConfig::default());
//! let data = format.parse(std::path::Path::new("pendant_20381207.csv"))?;
//! println!("{} readings", data.environment().len());
//! # Ok(())
//! # }
//! ```

pub mod hobo;
pub mod ibutton;
pub mod inkbird;

#[cfg(test)]
pub mod tests;

pub use hobo::parse_hobo;
pub use ibutton::{parse_ibutton_multi, parse_ibutton_single};
pub use inkbird::parse_inkbird;

use crate::config::{HoboConfig, IButtonConfig, InkBirdConfig};
use crate::error::Result;
use crate::models::ParsedLoggerData;
use std::fmt;
use std::path::Path;

/// Supported logger export formats with their per-call configuration
#[derive(Debug, Clone)]
pub enum LoggerFormat {
    Hobo(HoboConfig),
    InkBird(InkBirdConfig),
    IButtonMulti(IButtonConfig),
    IButtonSingle(IButtonConfig),
}

impl LoggerFormat {
    /// Parse one file with this format's parser
    pub fn parse(&self, file_path: &Path) -> Result<ParsedLoggerData> {
        match self {
            LoggerFormat::Hobo(config) => parse_hobo(file_path, config),
            LoggerFormat::InkBird(config) => parse_inkbird(file_path, config),
            LoggerFormat::IButtonMulti(config) => parse_ibutton_multi(file_path, config),
            LoggerFormat::IButtonSingle(config) => parse_ibutton_single(file_path, config),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoggerFormat::Hobo(_) => "HOBO",
            LoggerFormat::InkBird(_) => "Ink-Bird",
            LoggerFormat::IButtonMulti(_) => "iButton (multi-logger)",
            LoggerFormat::IButtonSingle(_) => "iButton (single-logger)",
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
