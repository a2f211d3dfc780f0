//! Timestamp detection, parsing and decomposition.
//!
//! Logger exports encode time in several ways: locale-ordered dates with
//! 12h or 24h clocks, fixed ISO-like formats, and Excel serial day counts.
//! Everything funnels into a [`NaiveDateTime`] that is then rendered in the
//! canonical `YYYY-MM-DD HH:MM:SS` form and split into integer components.

use crate::config::{DateOrder, ExcelEpoch};
use crate::constants::{CANONICAL_TIMESTAMP_FORMAT, excel};
use chrono::{Datelike, NaiveDateTime, TimeDelta, TimeZone, Timelike};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Integer components of a timestamp plus its canonical rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub formatted: String,
}

impl TimestampParts {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            formatted: dt.format(CANONICAL_TIMESTAMP_FORMAT).to_string(),
        }
    }
}

const TIME_FORMATS: [&str; 4] = ["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S", "%H:%M"];

/// Candidate chrono formats for a date component order.
///
/// Two-digit years are tried before four-digit years: `%Y` happily accepts
/// `19` as the year 19.
pub fn date_order_formats(order: DateOrder) -> Vec<String> {
    let date_formats: &[&str] = match order {
        DateOrder::YearMonthDay => &["%y-%m-%d", "%Y-%m-%d"],
        DateOrder::MonthDayYear => &["%m-%d-%y", "%m-%d-%Y"],
        DateOrder::DayMonthYear => &["%d-%m-%y", "%d-%m-%Y"],
    };

    date_formats
        .iter()
        .flat_map(|date| TIME_FORMATS.iter().map(move |time| format!("{date} {time}")))
        .collect()
}

/// Parse `value` with the first matching format.
///
/// Date separators `/` and `.` are folded to `-` first so a single format
/// list covers all vendor variants.
pub fn parse_with_formats<S: AsRef<str>>(value: &str, formats: &[S]) -> Option<NaiveDateTime> {
    let normalized = normalize_date_separators(value);
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt.as_ref()).ok())
}

fn normalize_date_separators(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.split_once(' ') {
        Some((date, time)) => {
            format!("{} {}", date.replace(['/', '.'], "-"), time.trim())
        }
        None => trimmed.replace(['/', '.'], "-"),
    }
}

/// Parse a timestamp written in a caller-selected date component order
pub fn parse_ordered(value: &str, order: DateOrder) -> Option<NaiveDateTime> {
    parse_with_formats(value, &date_order_formats(order)[..])
}

/// Convert a `GMT±HH[:MM]` header token into an `Etc/` timezone identifier.
///
/// The hour is written without leading zeros, and the minutes are only kept
/// when non-zero so an on-the-hour offset never ends in `:00`.
pub fn gmt_offset_to_olson(sign: &str, hours: &str, minutes: Option<&str>) -> String {
    let hours: u32 = hours.parse().unwrap_or(0);
    let minutes: u32 = minutes.and_then(|m| m.parse().ok()).unwrap_or(0);

    if minutes == 0 {
        format!("Etc/GMT{sign}{hours}")
    } else {
        format!("Etc/GMT{sign}{hours}:{minutes:02}")
    }
}

/// Resolve an identifier against the IANA database
pub fn resolve_timezone(identifier: &str) -> Option<Tz> {
    Tz::from_str(identifier).ok()
}

/// Localize a wall-clock time to `tz` and return the wall-clock value kept.
///
/// `None` means the local time does not exist in that zone.
pub fn localize(naive: &NaiveDateTime, tz: &Tz) -> Option<NaiveDateTime> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.naive_local())
}

/// Convert an Excel serial day count into an absolute time
pub fn excel_serial_to_datetime(serial: f64, epoch: ExcelEpoch) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let seconds = (serial * excel::SECONDS_PER_DAY).round() as i64;
    let base = epoch.day_zero().and_hms_opt(0, 0, 0)?;
    let dt = base.checked_add_signed(TimeDelta::try_seconds(seconds)?);
    debug!("Excel serial {} -> {:?}", serial, dt);
    dt
}
