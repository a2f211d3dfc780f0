//! Multi-logger iButton dumps.
//!
//! Download software appends one block per device to a single file:
//!
//! ```text
//! Date/time logger downloaded:,2019-08-22 13:47:50
//! Logger serial number:,5D00-0000-4B6F-D241
//! ...
//! 2019-07-01 00:00:00,21.50,65.30
//! 2019-07-01 01:00:00,21.00,66.10
//! <gap>
//! <gap>
//! Date/time logger downloaded:,...
//! ...
//! -end-
//! ```
//!
//! Blocks are segmented first, then each block is parsed on its own.

use super::{find_end_markers, find_start_markers, strip_punctuation};
use crate::config::IButtonConfig;
use crate::constants::{ibutton, units};
use crate::error::{ReaderError, Result};
use crate::models::{EnvironmentReading, ParsedLoggerData, UnitsTable, Variable};
use crate::text::read_lines;
use crate::timestamp::{TimestampParts, parse_with_formats};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static DATA_ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ibutton::DATA_ROW_PATTERN).expect("valid data row pattern"));

/// Inclusive line range of one device's block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start: usize,
    pub end: usize,
}

/// Parse a file holding concatenated dumps from several iButtons
pub fn parse_ibutton_multi(file_path: &Path, config: &IButtonConfig) -> Result<ParsedLoggerData> {
    info!("Parsing multi-logger iButton file: {}", file_path.display());

    let lines = read_lines(file_path, config.encoding)?;
    let (blocks, mut warnings) = segment_blocks(&lines, file_path)?;

    let mut environment = Vec::new();
    for block in &blocks {
        let block_lines = &lines[block.start..=block.end];
        let parsed = parse_block(block_lines, file_path, config)?;
        debug!(
            "{}: block at line {} yielded {} readings for logger {}",
            file_path.display(),
            block.start + 1,
            parsed.readings.len(),
            parsed.serial
        );
        environment.extend(parsed.readings);
        warnings.extend(parsed.warnings);
    }

    let units_table = UnitsTable::from_readings(&environment, |variable| match variable {
        Variable::Temp => Some(units::CELSIUS.to_string()),
        Variable::RH => Some(units::PERCENT.to_string()),
        Variable::Illuminance => None,
    });

    Ok(ParsedLoggerData::new(environment, None, units_table).with_warnings(warnings))
}

/// Split a multi-logger file into per-device blocks.
///
/// Every block but the last ends [`ibutton::BLOCK_GAP_LINES`] lines before
/// the next start marker; the last ends one line before the end-of-file
/// marker. Data rows found in a gap are reported as warnings since they
/// mean the gap assumption does not hold for this file.
pub fn segment_blocks(lines: &[String], file_path: &Path) -> Result<(Vec<Block>, Vec<String>)> {
    let starts = find_start_markers(lines);
    if starts.is_empty() {
        return Err(ReaderError::malformed(
            file_path,
            format!("no '{}' marker found", ibutton::START_MARKER),
        ));
    }

    let (marker, end_markers) = find_end_markers(lines).ok_or_else(|| {
        ReaderError::malformed(
            file_path,
            format!("none of the end markers {:?} found", ibutton::END_MARKERS),
        )
    })?;

    let mut ends = Vec::with_capacity(starts.len());
    for pair in starts.windows(2) {
        let end = pair[1]
            .checked_sub(ibutton::BLOCK_GAP_LINES)
            .filter(|end| *end >= pair[0])
            .ok_or_else(|| {
                ReaderError::malformed(
                    file_path,
                    format!("blocks starting at lines {} and {} overlap", pair[0] + 1, pair[1] + 1),
                )
            })?;
        ends.push(end);
    }

    let last_start = starts[starts.len() - 1];
    ends.extend(
        end_markers
            .iter()
            .filter(|m| **m > last_start)
            .map(|m| m - 1),
    );

    if starts.len() != ends.len() {
        return Err(ReaderError::malformed(
            file_path,
            format!(
                "found {} block starts but {} block ends (end marker '{}')",
                starts.len(),
                ends.len(),
                marker
            ),
        ));
    }

    let blocks: Vec<Block> = starts
        .iter()
        .zip(&ends)
        .map(|(&start, &end)| Block { start, end })
        .collect();

    let mut warnings = Vec::new();
    for (block, next_start) in blocks.iter().zip(starts.iter().skip(1)) {
        let gap = &lines[block.end + 1..*next_start];
        if gap.iter().any(|line| DATA_ROW_RE.is_match(line)) {
            let message = format!(
                "data rows between line {} and the next block at line {} were dropped",
                block.end + 1,
                next_start + 1
            );
            warn!("{}: {}", file_path.display(), message);
            warnings.push(message);
        }
    }

    debug!(
        "Segmented {} into {} blocks using end marker '{}'",
        file_path.display(),
        blocks.len(),
        marker
    );
    Ok((blocks, warnings))
}

/// Readings of one device's block
#[derive(Debug, Clone)]
pub struct BlockData {
    pub serial: String,
    pub readings: Vec<EnvironmentReading>,
    pub warnings: Vec<String>,
}

/// Parse the lines of a single block
pub fn parse_block(lines: &[String], file_path: &Path, config: &IButtonConfig) -> Result<BlockData> {
    let serial = lines
        .iter()
        .find(|line| line.contains(ibutton::MULTI_SERIAL_LABEL))
        .and_then(|line| line.split(',').nth(1))
        .map(strip_punctuation)
        .filter(|serial| !serial.is_empty())
        .ok_or_else(|| ReaderError::MissingSerial {
            path: file_path.to_path_buf(),
        })?;

    let mut warnings = Vec::new();
    let Some(first_row) = lines.iter().position(|line| DATA_ROW_RE.is_match(line)) else {
        let message = format!("no data rows for logger {}", serial);
        warn!("{}: {}", file_path.display(), message);
        warnings.push(message);
        return Ok(BlockData {
            serial,
            readings: Vec::new(),
            warnings,
        });
    };

    // Timestamp, Temp and RH lead; anything after them is discarded
    let column_count = lines[first_row].split(',').count();
    let discarded = column_count.saturating_sub(3);
    if discarded > 0 {
        debug!("Discarding {} trailing columns for logger {}", discarded, serial);
    }

    let mut readings = Vec::new();
    let mut incomplete = 0usize;
    for line in lines[first_row..].iter().filter(|l| !l.trim().is_empty()) {
        match block_reading(line, column_count, &serial, config) {
            Some(reading) => readings.push(reading),
            None => incomplete += 1,
        }
    }

    if incomplete > 0 {
        debug!(
            "Skipped {} incomplete rows for logger {} in {}",
            incomplete,
            serial,
            file_path.display()
        );
    }

    Ok(BlockData {
        serial,
        readings,
        warnings,
    })
}

fn block_reading(
    line: &str,
    column_count: usize,
    serial: &str,
    config: &IButtonConfig,
) -> Option<EnvironmentReading> {
    let fields: Vec<&str> = line.split(',').map(str::trim).take(column_count).collect();
    if fields.len() < 3 {
        return None;
    }

    let naive = parse_with_formats(fields[0], &ibutton::MULTI_TIMESTAMP_FORMATS[..])?;
    let temp = fields[1].parse::<f64>().ok()?;
    let rh = fields[2].parse::<f64>().ok()?;
    let parts = TimestampParts::from_datetime(&naive);

    Some(EnvironmentReading {
        year: parts.year,
        month: parts.month,
        day: parts.day,
        hour: parts.hour,
        minute: parts.minute,
        second: parts.second,
        timezone: config.timezone.clone(),
        timestamp: parts.formatted,
        logger_serial: Some(serial.to_string()),
        temp: Some(temp),
        rh: Some(rh),
        illuminance: None,
    })
}
