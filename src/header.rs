//! HOBO header parsing and metadata extraction.
//!
//! The second line of a HOBOware CSV export names every column and embeds
//! the logger serial number (`S/N: 20381207`), the timezone offset of the
//! timestamp column (`GMT-04:00`) and the unit of each measurement. This
//! module turns that line into a column layout plus file-level metadata.

use crate::config::TextEncoding;
use crate::constants::hobo;
use crate::error::{ReaderError, Result};
use crate::models::EventType;
use crate::text::read_head;
use crate::timestamp::gmt_offset_to_olson;
use crate::units::{IlluminanceUnit, TemperatureUnit};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

static SERIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(hobo::SERIAL_PATTERN).expect("valid serial pattern"));
static GMT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(hobo::GMT_OFFSET_PATTERN).expect("valid GMT pattern"));
static FAHRENHEIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(hobo::FAHRENHEIT_PATTERN).expect("valid unit pattern"));
static CELSIUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(hobo::CELSIUS_PATTERN).expect("valid unit pattern"));
static LUMEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(hobo::LUMEN_PATTERN).expect("valid unit pattern"));
static LUX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(hobo::LUX_PATTERN).expect("valid unit pattern"));

/// What a HOBO column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Timestamp,
    Temp(TemperatureUnit),
    Rh,
    Intensity(IlluminanceUnit),
    Event(EventType),
    Ignored,
}

/// Metadata and column layout of a HOBO export
#[derive(Debug, Clone)]
pub struct HoboHeader {
    pub title: String,
    pub serial: String,
    /// `Etc/GMT±H[:MM]`
    pub timezone: String,
    pub columns: Vec<ColumnRole>,
    /// Non-fatal layout anomalies
    pub warnings: Vec<String>,
}

impl HoboHeader {
    pub fn timestamp_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| *c == ColumnRole::Timestamp)
    }

    pub fn has_events(&self) -> bool {
        self.columns.iter().any(|c| matches!(c, ColumnRole::Event(_)))
    }

    pub fn temperature(&self) -> Option<(usize, TemperatureUnit)> {
        self.columns.iter().enumerate().find_map(|(i, c)| match c {
            ColumnRole::Temp(unit) => Some((i, *unit)),
            _ => None,
        })
    }

    pub fn humidity(&self) -> Option<usize> {
        self.columns.iter().position(|c| *c == ColumnRole::Rh)
    }

    pub fn intensity(&self) -> Option<(usize, IlluminanceUnit)> {
        self.columns.iter().enumerate().find_map(|(i, c)| match c {
            ColumnRole::Intensity(unit) => Some((i, *unit)),
            _ => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = (usize, EventType)> + '_ {
        self.columns.iter().enumerate().filter_map(|(i, c)| match c {
            ColumnRole::Event(event) => Some((i, *event)),
            _ => None,
        })
    }
}

/// Read the two header lines of a HOBO export and extract its metadata.
///
/// The file is closed again before this returns.
pub fn parse_hobo_header(file_path: &Path, encoding: TextEncoding) -> Result<HoboHeader> {
    let lines = read_head(file_path, hobo::HEADER_LINES, encoding)?;
    if lines.len() < hobo::HEADER_LINES {
        return Err(ReaderError::malformed(
            file_path,
            "expected a title line followed by a column header line",
        ));
    }

    let header = parse_header_lines(&lines[0], &lines[1], file_path)?;
    debug!(
        "Parsed HOBO header for {}: serial={}, timezone={}, columns={:?}",
        file_path.display(),
        header.serial,
        header.timezone,
        header.columns
    );
    Ok(header)
}

/// Extract metadata from already-read title and column header lines
pub fn parse_header_lines(title: &str, column_line: &str, file_path: &Path) -> Result<HoboHeader> {
    let mut builder = HoboHeaderBuilder::new(title);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(column_line.as_bytes());
    let record = reader
        .records()
        .next()
        .transpose()?
        .ok_or_else(|| ReaderError::malformed(file_path, "empty column header line"))?;

    for field in record.iter() {
        builder.parse_field(field.trim(), file_path)?;
    }

    builder.parse_metadata(column_line);
    builder.build(file_path)
}

/// Builder for HOBO header metadata
struct HoboHeaderBuilder {
    title: String,
    serials: Vec<String>,
    timezone: Option<String>,
    columns: Vec<ColumnRole>,
    warnings: Vec<String>,
}

impl HoboHeaderBuilder {
    fn new(title: &str) -> Self {
        Self {
            title: title.trim().trim_matches('"').to_string(),
            serials: Vec::new(),
            timezone: None,
            columns: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Collect the serial and timezone tokens from the raw header line
    fn parse_metadata(&mut self, line: &str) {
        for caps in SERIAL_RE.captures_iter(line) {
            let serial = caps[1].to_string();
            if !self.serials.contains(&serial) {
                self.serials.push(serial);
            }
        }

        if let Some(caps) = GMT_RE.captures(line) {
            let minutes = caps.get(3).map(|m| m.as_str());
            self.timezone = Some(gmt_offset_to_olson(&caps[1], &caps[2], minutes));
        }
    }

    fn parse_field(&mut self, field: &str, file_path: &Path) -> Result<()> {
        let role = if field.contains(hobo::TIMESTAMP_COLUMN) {
            ColumnRole::Timestamp
        } else if let Some(event) = EventType::from_header(field) {
            ColumnRole::Event(event)
        } else if field.contains(hobo::TEMP_COLUMN) {
            ColumnRole::Temp(temperature_unit(field).ok_or_else(|| {
                ReaderError::MissingUnit {
                    path: file_path.to_path_buf(),
                    column: field.to_string(),
                }
            })?)
        } else if field.contains(hobo::RH_COLUMN) {
            ColumnRole::Rh
        } else if field.contains(hobo::INTENSITY_COLUMN) {
            ColumnRole::Intensity(illuminance_unit(field).ok_or_else(|| {
                ReaderError::MissingUnit {
                    path: file_path.to_path_buf(),
                    column: field.to_string(),
                }
            })?)
        } else {
            ColumnRole::Ignored
        };

        let duplicate = role != ColumnRole::Ignored
            && !matches!(role, ColumnRole::Event(_))
            && self
                .columns
                .iter()
                .any(|c| std::mem::discriminant(c) == std::mem::discriminant(&role));

        if duplicate {
            let message = format!("ignoring duplicate column '{}'", field);
            warn!("{}: {}", file_path.display(), message);
            self.warnings.push(message);
            self.columns.push(ColumnRole::Ignored);
        } else {
            self.columns.push(role);
        }

        Ok(())
    }

    fn build(mut self, file_path: &Path) -> Result<HoboHeader> {
        let serial = match self.serials.len() {
            0 => {
                return Err(ReaderError::MissingSerial {
                    path: file_path.to_path_buf(),
                });
            }
            1 => self.serials.remove(0),
            _ => {
                return Err(ReaderError::AmbiguousSerial {
                    path: file_path.to_path_buf(),
                    serials: self.serials,
                });
            }
        };

        let timezone = self.timezone.ok_or_else(|| ReaderError::MissingTimezone {
            path: file_path.to_path_buf(),
        })?;

        // Column 2 may only stand in for the timestamp if nothing else claimed it
        if !self.columns.contains(&ColumnRole::Timestamp) {
            if self.columns.get(1) == Some(&ColumnRole::Ignored) {
                let message = "no 'Date Time' column, assuming column 2 holds timestamps";
                warn!("{}: {}", file_path.display(), message);
                self.warnings.push(message.to_string());
                self.columns[1] = ColumnRole::Timestamp;
            } else {
                return Err(ReaderError::malformed(file_path, "no timestamp column"));
            }
        }

        Ok(HoboHeader {
            title: self.title,
            serial,
            timezone,
            columns: self.columns,
            warnings: self.warnings,
        })
    }
}

/// Unit part of a column name, without the serial-number parenthetical
fn unit_segment(field: &str) -> &str {
    field.split('(').next().unwrap_or(field)
}

fn temperature_unit(field: &str) -> Option<TemperatureUnit> {
    let segment = unit_segment(field);
    if FAHRENHEIT_RE.is_match(segment) {
        Some(TemperatureUnit::Fahrenheit)
    } else if CELSIUS_RE.is_match(segment) {
        Some(TemperatureUnit::Celsius)
    } else {
        None
    }
}

fn illuminance_unit(field: &str) -> Option<IlluminanceUnit> {
    let segment = unit_segment(field);
    if LUMEN_RE.is_match(segment) {
        Some(IlluminanceUnit::LumenPerSqFt)
    } else if LUX_RE.is_match(segment) {
        Some(IlluminanceUnit::Lux)
    } else {
        None
    }
}
