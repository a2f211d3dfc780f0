//! Per-parser configuration.
//!
//! Every parse call receives its own configuration value; nothing here is
//! process-wide. The text encoding in particular is an explicit parameter of
//! the line reader rather than a global locale setting.

use crate::constants::{excel, ibutton};
use crate::error::{ReaderError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Order of the date components in a HOBO timestamp column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateOrder {
    YearMonthDay,
    #[default]
    MonthDayYear,
    DayMonthYear,
}

/// Unit system for converted measurement columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    /// Keep whatever unit the logger recorded
    #[default]
    AsIs,
    /// °C and lux
    Metric,
    /// °F and lum/ft²
    Imperial,
}

/// Character encoding used when reading logger text files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1, one byte per character
    Latin1,
    /// UTF-8 when valid, Latin-1 otherwise
    #[default]
    Auto,
}

/// Day zero for Excel serial dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExcelEpoch {
    /// 1899-12-30, the Windows spreadsheet date system
    #[default]
    Epoch1900,
    /// 1904-01-01, the classic Mac spreadsheet date system
    Epoch1904,
    Custom(NaiveDate),
}

impl ExcelEpoch {
    /// Calendar date of day zero
    pub fn day_zero(&self) -> NaiveDate {
        let (y, m, d) = match self {
            ExcelEpoch::Epoch1900 => excel::EPOCH_1900,
            ExcelEpoch::Epoch1904 => excel::EPOCH_1904,
            ExcelEpoch::Custom(date) => return *date,
        };
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }
}

/// Configuration for the HOBO CSV parser
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoboConfig {
    pub date_order: DateOrder,
    pub unit_system: UnitSystem,
    pub encoding: TextEncoding,
}

impl HoboConfig {
    pub fn with_date_order(mut self, date_order: DateOrder) -> Self {
        self.date_order = date_order;
        self
    }

    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = unit_system;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Hook deriving extra metadata (site, plot, ...) from a file name
pub type NameMetadataFn = fn(&Path) -> Vec<(String, String)>;

/// Configuration for the Ink-Bird text parser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InkBirdConfig {
    /// Timezone label attached verbatim to every row
    pub timezone: String,
    pub encoding: TextEncoding,
    #[serde(skip)]
    pub name_metadata: Option<NameMetadataFn>,
}

impl InkBirdConfig {
    /// Ink-Bird exports carry no timezone, so the caller always names one
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            encoding: TextEncoding::default(),
            name_metadata: None,
        }
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_name_metadata(mut self, hook: NameMetadataFn) -> Self {
        self.name_metadata = Some(hook);
        self
    }
}

/// Configuration shared by both iButton parsers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IButtonConfig {
    /// Only consulted for Excel serial timestamps
    pub excel_epoch: ExcelEpoch,
    pub timezone: String,
    pub encoding: TextEncoding,
}

impl Default for IButtonConfig {
    fn default() -> Self {
        Self {
            excel_epoch: ExcelEpoch::default(),
            timezone: ibutton::DEFAULT_TIMEZONE.to_string(),
            encoding: TextEncoding::Auto,
        }
    }
}

impl IButtonConfig {
    pub fn with_excel_epoch(mut self, excel_epoch: ExcelEpoch) -> Self {
        self.excel_epoch = excel_epoch;
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Configuration for parsing many files at once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum concurrent parse calls
    pub max_concurrent_files: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: num_cpus::get_physical()
                .clamp(1, crate::constants::MAX_CONCURRENT_FILES),
        }
    }
}

impl BatchConfig {
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Reject settings that would stall or oversubscribe the pool
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(ReaderError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }
        if self.max_concurrent_files > crate::constants::MAX_CONCURRENT_FILES {
            return Err(ReaderError::Configuration {
                message: format!(
                    "max_concurrent_files must not exceed {}",
                    crate::constants::MAX_CONCURRENT_FILES
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_epoch_day_zero() {
        assert_eq!(
            ExcelEpoch::Epoch1900.day_zero(),
            NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()
        );
        assert_eq!(
            ExcelEpoch::Epoch1904.day_zero(),
            NaiveDate::from_ymd_opt(1904, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_batch_config_validation() {
        assert!(BatchConfig::default().with_max_concurrent_files(4).validate().is_ok());
        assert!(BatchConfig::default().with_max_concurrent_files(0).validate().is_err());
        assert!(BatchConfig::default().with_max_concurrent_files(1000).validate().is_err());
    }

    #[test]
    fn test_inkbird_config_keeps_caller_timezone() {
        let config = InkBirdConfig::new("Australia/Adelaide").with_encoding(TextEncoding::Latin1);
        assert_eq!(config.timezone, "Australia/Adelaide");
        assert_eq!(config.encoding, TextEncoding::Latin1);
        assert!(config.name_metadata.is_none());
    }

    #[test]
    fn test_hobo_config_builder() {
        let config = HoboConfig::default()
            .with_date_order(DateOrder::DayMonthYear)
            .with_unit_system(UnitSystem::Metric);
        assert_eq!(config.date_order, DateOrder::DayMonthYear);
        assert_eq!(config.unit_system, UnitSystem::Metric);
        assert_eq!(config.encoding, TextEncoding::Auto);
    }
}
