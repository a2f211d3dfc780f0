//! HOBO pendant logger CSV parser.
//!
//! HOBOware exports carry a title line, a column header line with embedded
//! metadata, and then one row per logging interval. Rows where a device
//! event fired (coupler attached, host connected, ...) have empty sensor
//! columns and a `Logged` marker in the event column; those rows feed the
//! event table instead of the environment table.

use crate::config::HoboConfig;
use crate::constants::{hobo, units};
use crate::error::Result;
use crate::header::{HoboHeader, parse_hobo_header};
use crate::models::{DeviceEvent, EnvironmentReading, ParsedLoggerData, UnitsTable, Variable};
use crate::text::read_text;
use crate::timestamp::{TimestampParts, localize, parse_ordered, resolve_timezone};
use crate::units::{IlluminanceUnit, TemperatureUnit};
use csv::StringRecord;
use std::path::Path;
use tracing::{debug, info, warn};

/// Parse a HOBOware CSV export
pub fn parse_hobo(file_path: &Path, config: &HoboConfig) -> Result<ParsedLoggerData> {
    info!("Parsing HOBO file: {}", file_path.display());

    // Header first; the file is closed again before the bulk read below
    let header = parse_hobo_header(file_path, config.encoding)?;
    let mut warnings = header.warnings.clone();

    let tz = resolve_timezone(&header.timezone);
    if tz.is_none() {
        let message = format!(
            "timezone '{}' is not an IANA identifier, keeping wall-clock times",
            header.timezone
        );
        warn!("{}: {}", file_path.display(), message);
        warnings.push(message);
    }

    let layout = ColumnLayout::new(&header, config);
    if !layout.has_measurements() {
        let message = "no Temp, RH or Intensity column found".to_string();
        warn!("{}: {}", file_path.display(), message);
        warnings.push(message);
    }

    let text = read_text(file_path, config.encoding)?;
    let body = text
        .lines()
        .skip(hobo::HEADER_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut environment = Vec::new();
    let mut events = Vec::new();
    let mut bad_timestamps = 0usize;
    let mut total_rows = 0usize;

    for record in reader.records() {
        let record = record?;
        total_rows += 1;

        let Some(raw) = field(&record, layout.timestamp) else {
            bad_timestamps += 1;
            continue;
        };
        let parsed = parse_ordered(raw, config.date_order).and_then(|naive| match &tz {
            Some(tz) => localize(&naive, tz),
            None => Some(naive),
        });
        let Some(naive) = parsed else {
            bad_timestamps += 1;
            continue;
        };
        let parts = TimestampParts::from_datetime(&naive);

        for (index, event_type) in header.events() {
            if field(&record, index).is_some() {
                events.push(DeviceEvent {
                    timestamp: parts.formatted.clone(),
                    event_type,
                    logger_serial: header.serial.clone(),
                });
            }
        }

        if let Some(reading) = layout.reading(&record, &parts, &header) {
            environment.push(reading);
        }
    }

    if bad_timestamps > 0 {
        let message = format!(
            "skipped {} of {} rows with unparseable timestamps (date order {:?})",
            bad_timestamps, total_rows, config.date_order
        );
        warn!("{}: {}", file_path.display(), message);
        warnings.push(message);
    }

    debug!(
        "{}: {} readings, {} events from {} rows",
        file_path.display(),
        environment.len(),
        events.len(),
        total_rows
    );

    let units_table = UnitsTable::from_readings(&environment, |variable| layout.unit(variable));
    let event_table = header.has_events().then_some(events);

    Ok(ParsedLoggerData::new(environment, event_table, units_table).with_warnings(warnings))
}

/// Trimmed, non-empty field value
fn field(record: &StringRecord, index: usize) -> Option<&str> {
    record
        .get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn number(record: &StringRecord, index: usize) -> Option<f64> {
    field(record, index).and_then(|value| value.parse::<f64>().ok())
}

/// Measurement columns and the units they are converted between
struct ColumnLayout {
    timestamp: usize,
    temp: Option<(usize, TemperatureUnit, TemperatureUnit)>,
    rh: Option<usize>,
    intensity: Option<(usize, IlluminanceUnit, IlluminanceUnit)>,
}

impl ColumnLayout {
    fn new(header: &HoboHeader, config: &HoboConfig) -> Self {
        Self {
            timestamp: header.timestamp_index().unwrap_or(1),
            temp: header
                .temperature()
                .map(|(i, unit)| (i, unit, unit.target(config.unit_system))),
            rh: header.humidity(),
            intensity: header
                .intensity()
                .map(|(i, unit)| (i, unit, unit.target(config.unit_system))),
        }
    }

    fn has_measurements(&self) -> bool {
        self.temp.is_some() || self.rh.is_some() || self.intensity.is_some()
    }

    fn unit(&self, variable: Variable) -> Option<String> {
        match variable {
            Variable::Temp => self.temp.map(|(_, _, to)| to.symbol().to_string()),
            Variable::RH => self.rh.map(|_| units::PERCENT.to_string()),
            Variable::Illuminance => self.intensity.map(|(_, _, to)| to.symbol().to_string()),
        }
    }

    /// Build a reading when every detected measurement column has a value
    fn reading(
        &self,
        record: &StringRecord,
        parts: &TimestampParts,
        header: &HoboHeader,
    ) -> Option<EnvironmentReading> {
        if !self.has_measurements() {
            return None;
        }

        let temp = match self.temp {
            Some((i, from, to)) => Some(from.convert(number(record, i)?, to)),
            None => None,
        };
        let rh = match self.rh {
            Some(i) => Some(number(record, i)?),
            None => None,
        };
        let illuminance = match self.intensity {
            Some((i, from, to)) => Some(from.convert(number(record, i)?, to)),
            None => None,
        };

        Some(EnvironmentReading {
            year: parts.year,
            month: parts.month,
            day: parts.day,
            hour: parts.hour,
            minute: parts.minute,
            second: parts.second,
            timezone: header.timezone.clone(),
            timestamp: parts.formatted.clone(),
            logger_serial: Some(header.serial.clone()),
            temp,
            rh,
            illuminance,
        })
    }
}
