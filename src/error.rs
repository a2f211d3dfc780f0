//! Error handling for logger file parsing.
//!
//! Structural and metadata failures are fatal and carry the offending file
//! path. Incomplete rows are never errors; they are filtered out by the
//! parsers.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Ambiguous serial number in file: {path} - found {serials:?}")]
    AmbiguousSerial { path: PathBuf, serials: Vec<String> },

    #[error("No logger serial number found in file: {path}")]
    MissingSerial { path: PathBuf },

    #[error("No timezone offset found in header of file: {path}")]
    MissingTimezone { path: PathBuf },

    #[error("Unit could not be determined for column '{column}' in file: {path}")]
    MissingUnit { path: PathBuf, column: String },

    #[error("Malformed logger file: {path} - {reason}")]
    MalformedFile { path: PathBuf, reason: String },

    #[error("Unrecognized timestamp encoding in file: {path}")]
    UnrecognizedTimestamp { path: PathBuf },

    #[error("Type mismatch: expected {expected}, found a different type")]
    TypeMismatch { expected: &'static str },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Parse task failed for file: {path} - {reason}")]
    TaskFailed { path: PathBuf, reason: String },
}

impl ReaderError {
    pub(crate) fn malformed(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::MalformedFile {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;
