//! Single-logger iButton dumps.
//!
//! One device per file. Timestamps are either human readable
//! (`2019/07/01 00:00:00`) or, when the dump went through a spreadsheet,
//! bare Excel serial day counts (`43647.5`). Hygrochron devices write a
//! temperature section and then a `%RH` section over the same timestamps.

use super::{find_end_markers, find_start_markers, strip_punctuation};
use crate::config::{ExcelEpoch, IButtonConfig};
use crate::constants::{ibutton, units};
use crate::error::{ReaderError, Result};
use crate::models::{EnvironmentReading, ParsedLoggerData, UnitsTable, Variable};
use crate::text::read_lines;
use crate::timestamp::{TimestampParts, excel_serial_to_datetime};
use crate::units::TemperatureUnit;
use chrono::NaiveDateTime;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static READABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ibutton::READABLE_TIMESTAMP_PATTERN).expect("valid timestamp pattern")
});
static EXCEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ibutton::EXCEL_SERIAL_PATTERN).expect("valid serial pattern"));

/// How timestamps are written in a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampEncoding {
    Readable,
    ExcelSerial,
}

impl TimestampEncoding {
    /// Detect the encoding used in `lines`, preferring the readable form
    pub fn detect(lines: &[String]) -> Option<Self> {
        if lines.iter().any(|line| READABLE_RE.is_match(line)) {
            Some(TimestampEncoding::Readable)
        } else if lines.iter().any(|line| EXCEL_RE.is_match(line)) {
            Some(TimestampEncoding::ExcelSerial)
        } else {
            None
        }
    }

    fn parse(&self, field: &str, epoch: ExcelEpoch) -> Option<NaiveDateTime> {
        match self {
            TimestampEncoding::Readable => {
                NaiveDateTime::parse_from_str(field.trim(), ibutton::READABLE_TIMESTAMP_FORMAT).ok()
            }
            TimestampEncoding::ExcelSerial => {
                let serial = field.trim().parse::<f64>().ok()?;
                excel_serial_to_datetime(serial, epoch)
            }
        }
    }
}

/// Parse a dump from a single iButton
pub fn parse_ibutton_single(file_path: &Path, config: &IButtonConfig) -> Result<ParsedLoggerData> {
    info!("Parsing single-logger iButton file: {}", file_path.display());

    let lines = read_lines(file_path, config.encoding)?;
    let mut warnings = Vec::new();

    let start = match find_start_markers(&lines).first() {
        Some(&start) => start,
        None => {
            let message = format!(
                "no '{}' marker, reading from line 1",
                ibutton::START_MARKER
            );
            warn!("{}: {}", file_path.display(), message);
            warnings.push(message);
            0
        }
    };

    let end = find_end_markers(&lines)
        .and_then(|(_, hits)| hits.into_iter().find(|&i| i > start))
        .ok_or_else(|| {
            ReaderError::malformed(
                file_path,
                format!("none of the end markers {:?} found", ibutton::END_MARKERS),
            )
        })?;

    let section = &lines[start..end];
    let encoding = TimestampEncoding::detect(section).ok_or_else(|| {
        ReaderError::UnrecognizedTimestamp {
            path: file_path.to_path_buf(),
        }
    })?;
    debug!("{}: timestamp encoding {:?}", file_path.display(), encoding);

    let serial = find_serial(&lines).ok_or_else(|| ReaderError::MissingSerial {
        path: file_path.to_path_buf(),
    })?;

    // Hygrochron dumps repeat the timestamps once per sensor section, so
    // values are merged per timestamp in order of first appearance
    let mut file_unit: Option<TemperatureUnit> = None;
    let mut merged: Vec<MergedRow> = Vec::new();
    let mut index: HashMap<NaiveDateTime, usize> = HashMap::new();
    let mut unknown_units: Vec<String> = Vec::new();
    let mut dropped = 0usize;

    for line in section {
        let row = match DataRow::parse(line, encoding, config.excel_epoch) {
            ParsedLine::Data(row) => row,
            ParsedLine::UnknownUnit(token) => {
                dropped += 1;
                if !unknown_units.contains(&token) {
                    unknown_units.push(token);
                }
                continue;
            }
            ParsedLine::Other => continue,
        };

        let slot = *index.entry(row.timestamp).or_insert_with(|| {
            merged.push(MergedRow::new(row.timestamp));
            merged.len() - 1
        });
        let target = &mut merged[slot];

        match row.measurement {
            Measurement::Temperature(unit) => {
                let to = *file_unit.get_or_insert(unit);
                if target.temp.is_none() {
                    target.temp = Some(unit.convert(row.values[0], to));
                }
                if target.rh.is_none() {
                    target.rh = row.values.get(1).copied();
                }
            }
            Measurement::Humidity => {
                if target.rh.is_none() {
                    target.rh = Some(row.values[0]);
                }
            }
        }
    }

    if dropped > 0 {
        let message = format!(
            "dropped {} rows with unrecognized unit {:?}",
            dropped, unknown_units
        );
        warn!("{}: {}", file_path.display(), message);
        warnings.push(message);
    }

    let environment: Vec<EnvironmentReading> = merged
        .into_iter()
        .map(|row| {
            let parts = TimestampParts::from_datetime(&row.timestamp);
            EnvironmentReading {
                year: parts.year,
                month: parts.month,
                day: parts.day,
                hour: parts.hour,
                minute: parts.minute,
                second: parts.second,
                timezone: config.timezone.clone(),
                timestamp: parts.formatted,
                logger_serial: Some(serial.clone()),
                temp: row.temp,
                rh: row.rh,
                illuminance: None,
            }
        })
        .collect();

    let temp_unit = file_unit.unwrap_or(TemperatureUnit::Celsius);
    let units_table = UnitsTable::from_readings(&environment, |variable| match variable {
        Variable::Temp => Some(temp_unit.symbol().to_string()),
        Variable::RH => Some(units::PERCENT.to_string()),
        Variable::Illuminance => None,
    });

    debug!(
        "{}: {} readings for logger {}",
        file_path.display(),
        environment.len(),
        serial
    );
    Ok(ParsedLoggerData::new(environment, None, units_table).with_warnings(warnings))
}

/// Serial number from the `Serial No` line, with punctuation stripped
fn find_serial(lines: &[String]) -> Option<String> {
    let line = lines
        .iter()
        .find(|line| line.contains(ibutton::SINGLE_SERIAL_LABEL))?;
    let (_, rest) = line.split_once(ibutton::SINGLE_SERIAL_LABEL)?;
    let value = rest
        .trim_start_matches(|c: char| c == ':' || c == ',' || c == '.' || c.is_whitespace())
        .split(',')
        .next()?;
    Some(strip_punctuation(value)).filter(|serial| !serial.is_empty())
}

/// Quantity a data line reports, taken from its unit token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measurement {
    Temperature(TemperatureUnit),
    Humidity,
}

impl Measurement {
    /// `None` for tokens that are not a known unit
    fn from_unit_token(token: &str) -> Option<Self> {
        match token {
            "C" => Some(Measurement::Temperature(TemperatureUnit::Celsius)),
            "F" => Some(Measurement::Temperature(TemperatureUnit::Fahrenheit)),
            _ if token.to_ascii_uppercase().contains(ibutton::HUMIDITY_UNIT) => {
                Some(Measurement::Humidity)
            }
            _ => None,
        }
    }
}

/// One data line: timestamp, optional unit token, then numeric values.
///
/// Lines without a unit token are temperature in °C followed by RH.
#[derive(Debug)]
struct DataRow {
    timestamp: NaiveDateTime,
    measurement: Measurement,
    values: Vec<f64>,
}

#[derive(Debug)]
enum ParsedLine {
    Data(DataRow),
    UnknownUnit(String),
    /// Not a data line, or a data line without values
    Other,
}

impl DataRow {
    fn parse(line: &str, encoding: TimestampEncoding, epoch: ExcelEpoch) -> ParsedLine {
        let mut fields = line.split(',').map(str::trim);
        let Some(timestamp) = fields.next().and_then(|f| encoding.parse(f, epoch)) else {
            return ParsedLine::Other;
        };

        let mut measurement = None;
        let mut values = Vec::with_capacity(2);
        for field in fields.filter(|f| !f.is_empty()) {
            if let Ok(value) = field.parse::<f64>() {
                values.push(value);
            } else if measurement.is_none() {
                match Measurement::from_unit_token(field) {
                    Some(m) => measurement = Some(m),
                    None => return ParsedLine::UnknownUnit(field.to_string()),
                }
            }
        }

        if values.is_empty() {
            return ParsedLine::Other;
        }
        ParsedLine::Data(Self {
            timestamp,
            measurement: measurement
                .unwrap_or(Measurement::Temperature(TemperatureUnit::Celsius)),
            values,
        })
    }
}

/// Values collected for one timestamp across sensor sections
struct MergedRow {
    timestamp: NaiveDateTime,
    temp: Option<f64>,
    rh: Option<f64>,
}

impl MergedRow {
    fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            temp: None,
            rh: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_detect_prefers_readable() {
        let both = lines("2019/07/01 00:00:00,C,21.5\n43647.5,C,21.5");
        assert_eq!(
            TimestampEncoding::detect(&both),
            Some(TimestampEncoding::Readable)
        );
        let excel = lines("Serial No: 1\n43647.5,C,21.5");
        assert_eq!(
            TimestampEncoding::detect(&excel),
            Some(TimestampEncoding::ExcelSerial)
        );
        assert_eq!(TimestampEncoding::detect(&lines("no data here")), None);
    }

    #[test]
    fn test_find_serial() {
        assert_eq!(
            find_serial(&lines("Serial No: 21-0000-0F3A-8841")),
            Some("2100000F3A8841".to_string())
        );
        assert_eq!(
            find_serial(&lines("Serial No,\"4C00000012345621\",x")),
            Some("4C00000012345621".to_string())
        );
        assert_eq!(find_serial(&lines("Serial No:")), None);
    }

    fn parse(line: &str) -> ParsedLine {
        DataRow::parse(line, TimestampEncoding::Readable, ExcelEpoch::Epoch1900)
    }

    #[test]
    fn test_data_row_with_unit_token() {
        let ParsedLine::Data(row) = parse("2019/07/01 06:30:00,F,70.7,55.5") else {
            panic!("expected a data row");
        };
        assert_eq!(
            row.measurement,
            Measurement::Temperature(TemperatureUnit::Fahrenheit)
        );
        assert_eq!(row.values, vec![70.7, 55.5]);
    }

    #[test]
    fn test_data_row_humidity_unit() {
        let ParsedLine::Data(row) = parse("2019/07/01 06:30:00,%RH,65.3") else {
            panic!("expected a data row");
        };
        assert_eq!(row.measurement, Measurement::Humidity);
        assert_eq!(row.values, vec![65.3]);
    }

    #[test]
    fn test_data_row_unknown_unit() {
        assert!(matches!(
            parse("2019/07/01 06:30:00,kPa,101.3"),
            ParsedLine::UnknownUnit(ref token) if token == "kPa"
        ));
        assert!(matches!(parse("Date/Time,Unit,Value"), ParsedLine::Other));
        assert!(matches!(parse("2019/07/01 06:30:00,C,"), ParsedLine::Other));
    }
}
