//! Ink-Bird text export parser.
//!
//! Ink-Bird loggers write a fixed 14-line preamble whose last line names
//! the columns, followed by whitespace-separated rows where the date and
//! time occupy two adjacent fields. The export carries no serial number
//! and no timezone, so the caller supplies the timezone label.

use crate::config::InkBirdConfig;
use crate::constants::{inkbird, units};
use crate::error::{ReaderError, Result};
use crate::models::{EnvironmentReading, ParsedLoggerData, UnitsTable, Variable};
use crate::text::read_lines;
use crate::timestamp::TimestampParts;
use chrono::NaiveDateTime;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static COLUMN_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t|\s{2,}").expect("valid separator pattern"));

/// Parse an Ink-Bird text export
pub fn parse_inkbird(file_path: &Path, config: &InkBirdConfig) -> Result<ParsedLoggerData> {
    info!("Parsing Ink-Bird file: {}", file_path.display());

    let lines = read_lines(file_path, config.encoding)?;
    if lines.len() < inkbird::HEADER_LINE {
        return Err(ReaderError::malformed(
            file_path,
            format!(
                "expected a {}-line preamble, found {} lines",
                inkbird::PREAMBLE_LINES,
                lines.len()
            ),
        ));
    }

    let headers = split_header(&lines[inkbird::HEADER_LINE - 1]);
    let temp_col = headers.iter().position(|h| h.contains(inkbird::TEMP_COLUMN));
    let humidity_col = headers
        .iter()
        .position(|h| h.contains(inkbird::HUMIDITY_COLUMN));
    debug!(
        "{}: columns {:?} (temp={:?}, humidity={:?})",
        file_path.display(),
        headers,
        temp_col,
        humidity_col
    );

    let mut warnings = Vec::new();
    if temp_col.is_none() && humidity_col.is_none() {
        let message = "no Temp or Humidity column in header".to_string();
        warn!("{}: {}", file_path.display(), message);
        warnings.push(message);
    }

    let mut environment = Vec::new();
    for line in lines[inkbird::PREAMBLE_LINES..]
        .iter()
        .filter(|l| !l.trim().is_empty())
    {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let Some(reading) = row_reading(&fields, temp_col, humidity_col, &config.timezone) {
            environment.push(reading);
        }
    }

    let units_table = UnitsTable::from_readings(&environment, |variable| match variable {
        Variable::Temp => Some(units::CELSIUS.to_string()),
        Variable::RH => Some(units::PERCENT.to_string()),
        Variable::Illuminance => None,
    });

    let metadata = config
        .name_metadata
        .map(|hook| hook(file_path))
        .unwrap_or_default();

    Ok(ParsedLoggerData::new(environment, None, units_table)
        .with_warnings(warnings)
        .with_file_metadata(metadata))
}

/// Column names of the header line, without the empty token left by indentation
fn split_header(line: &str) -> Vec<String> {
    COLUMN_SEPARATOR_RE
        .split(line)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Header column `i` maps to data field `i + 1`: date and time are two fields
fn row_reading(
    fields: &[&str],
    temp_col: Option<usize>,
    humidity_col: Option<usize>,
    timezone: &str,
) -> Option<EnvironmentReading> {
    if temp_col.is_none() && humidity_col.is_none() {
        return None;
    }

    let stamp = format!("{} {}", fields.first()?, fields.get(1)?);
    let naive = NaiveDateTime::parse_from_str(&stamp, inkbird::TIMESTAMP_FORMAT).ok()?;
    let value = |col: Option<usize>| -> Option<Option<f64>> {
        match col {
            Some(i) => fields.get(i + 1)?.parse::<f64>().ok().map(Some),
            None => Some(None),
        }
    };
    let temp = value(temp_col)?;
    let rh = value(humidity_col)?;
    let parts = TimestampParts::from_datetime(&naive);

    Some(EnvironmentReading {
        year: parts.year,
        month: parts.month,
        day: parts.day,
        hour: parts.hour,
        minute: parts.minute,
        second: parts.second,
        timezone: timezone.to_string(),
        timestamp: parts.formatted,
        logger_serial: None,
        temp,
        rh,
        illuminance: None,
    })
}
