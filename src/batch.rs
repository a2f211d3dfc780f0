//! Concurrent parsing of many logger files.
//!
//! Parse calls share no state, so a directory of exports is parsed by
//! running independent calls on the blocking thread pool with a bounded
//! number in flight. Results come back in input order, one per file; a
//! failing file never aborts the rest of the batch.

use crate::config::BatchConfig;
use crate::error::{ReaderError, Result};
use crate::models::ParsedLoggerData;
use crate::parsers::LoggerFormat;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, warn};

/// Outcome of parsing one file in a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<ParsedLoggerData>,
}

/// Batch processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_rows: usize,
    pub processing_time_ms: u128,
}

impl BatchStats {
    fn from_outcomes(outcomes: &[FileOutcome], started: Instant) -> Self {
        let mut stats = BatchStats::default();
        for outcome in outcomes {
            match &outcome.result {
                Ok(data) => {
                    stats.files_processed += 1;
                    stats.total_rows += data.environment().len();
                }
                Err(_) => stats.files_failed += 1,
            }
        }
        stats.processing_time_ms = started.elapsed().as_millis();
        stats
    }
}

/// Expand a glob pattern into the matching files, sorted
pub fn discover_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| ReaderError::Configuration {
        message: format!("invalid file pattern '{}': {}", pattern, e),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ReaderError::Io(e.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    debug!("Found {} files matching {}", files.len(), pattern);
    Ok(files)
}

/// Parse every file with `format`, at most `config.max_concurrent_files` at a time
pub async fn parse_files(
    paths: Vec<PathBuf>,
    format: LoggerFormat,
    config: &BatchConfig,
) -> Result<(Vec<FileOutcome>, BatchStats)> {
    config.validate()?;
    let started = Instant::now();
    let format = Arc::new(format);

    info!(
        "Parsing {} {} files with up to {} concurrent parses",
        paths.len(),
        format,
        config.max_concurrent_files
    );

    let outcomes: Vec<FileOutcome> = stream::iter(paths)
        .map(|path| {
            let format = Arc::clone(&format);
            async move {
                let task_path = path.clone();
                let result = task::spawn_blocking(move || format.parse(&task_path))
                    .await
                    .unwrap_or_else(|e| {
                        Err(ReaderError::TaskFailed {
                            path: path.clone(),
                            reason: e.to_string(),
                        })
                    });
                if let Err(e) = &result {
                    warn!("Failed to parse {}: {}", path.display(), e);
                }
                FileOutcome { path, result }
            }
        })
        .buffered(config.max_concurrent_files)
        .collect()
        .await;

    let stats = BatchStats::from_outcomes(&outcomes, started);
    info!(
        "Parsed {} files ({} failed), {} readings in {}ms",
        stats.files_processed, stats.files_failed, stats.total_rows, stats.processing_time_ms
    );
    Ok((outcomes, stats))
}

/// Discover files under `dir` with the given extension and parse them all
pub async fn parse_directory(
    dir: &Path,
    extension: &str,
    format: LoggerFormat,
    config: &BatchConfig,
) -> Result<(Vec<FileOutcome>, BatchStats)> {
    let pattern = dir.join(format!("**/*.{}", extension));
    let files = discover_files(&pattern.to_string_lossy())?;
    parse_files(files, format, config).await
}
