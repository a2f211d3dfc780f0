//! Microclimate Readers Library
//!
//! Parsers that normalize raw exports from field microclimate loggers into
//! one tabular shape.
//!
//! This library provides:
//! - HOBO pendant CSV parsing with header metadata extraction, unit
//!   conversion and a device-event table
//! - Ink-Bird text export parsing
//! - iButton parsing for multi-logger and single-logger dumps, including
//!   spreadsheet-mangled Excel serial timestamps
//! - Concurrent batch parsing of many files
//! - Polars frame export of the normalized tables
//!
//! Every parser returns a [`ParsedLoggerData`] holding an environment table,
//! an optional event table and a units table.

pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod text;
pub mod timestamp;
pub mod units;

// Re-export commonly used types
pub use error::{ReaderError, Result};
pub use models::{
    DeviceEvent, EnvironmentReading, EventType, ParsedLoggerData, UnitsTable, Variable,
};
pub use parsers::{
    LoggerFormat, parse_hobo, parse_ibutton_multi, parse_ibutton_single, parse_inkbird,
};

use std::any::Any;

/// Environment table of a parse result held behind a type-erased reference.
///
/// Fails with [`ReaderError::TypeMismatch`] when `data` is not a
/// [`ParsedLoggerData`].
pub fn environment_table(data: &dyn Any) -> Result<&[EnvironmentReading]> {
    data.downcast_ref::<ParsedLoggerData>()
        .map(ParsedLoggerData::environment)
        .ok_or(ReaderError::TypeMismatch {
            expected: "ParsedLoggerData",
        })
}
