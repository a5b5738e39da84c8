//! Data loading and management
//!
//! Handles loading OHLC bars from CSV files (the `Datetime`-indexed layout
//! written by common market data downloaders) and saving them back.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::Bar;

/// Input problems reported to the user as plain diagnostics
#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV file not found: {0}. Please check the file name and try again.")]
    NotFound(PathBuf),

    #[error("No usable bars in {0}")]
    Empty(PathBuf),

    #[error("Missing '{column}' column in {path}")]
    MissingColumn { column: &'static str, path: PathBuf },
}

/// Column positions resolved from the CSV header
#[derive(Debug, Clone, Copy)]
struct Columns {
    datetime: usize,
    open: Option<usize>,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self, DataError> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim();
                names.iter().any(|n| h.eq_ignore_ascii_case(n))
            })
        };
        let require = |column: &'static str| {
            find(&[column]).ok_or_else(|| DataError::MissingColumn {
                column,
                path: path.to_path_buf(),
            })
        };

        Ok(Columns {
            datetime: find(&["Datetime", "Date", "Timestamp", "Time"]).unwrap_or(0),
            open: find(&["Open"]),
            high: require("High")?,
            low: require("Low")?,
            close: require("Close")?,
            volume: find(&["Volume"]),
        })
    }
}

/// Parse a timestamp, dropping any UTC offset but keeping wall-clock time
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ndt);
        }
    }
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = nd.and_hms_opt(0, 0, 0) {
            return Ok(ndt);
        }
    }

    anyhow::bail!("Failed to parse datetime: {}", s)
}

/// Parse a date string (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
pub fn parse_date(date_str: &str) -> Result<NaiveDateTime> {
    parse_timestamp(date_str).context("Use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS format")
}

/// Parse an inclusive range end: a bare date means the end of that day
pub fn parse_end_date(date_str: &str) -> Result<NaiveDateTime> {
    if let Ok(nd) = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d") {
        if let Some(ndt) = nd.and_hms_nano_opt(23, 59, 59, 999_999_999) {
            return Ok(ndt);
        }
    }
    parse_date(date_str)
}

fn parse_price(record: &csv::StringRecord, idx: usize, name: &str) -> Result<Option<f64>> {
    match record.get(idx).map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(|v| if v.is_nan() { None } else { Some(v) })
            .context(format!("Failed to parse {}: {}", name, s)),
    }
}

/// Load OHLC bars from a CSV file with validation.
///
/// Rows with empty prices or inconsistent OHLC values are skipped with a
/// warning. The result is sorted by timestamp with duplicates removed.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()).into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("Failed to open CSV file")?;
    let columns = Columns::from_headers(reader.headers().context("Failed to read CSV header")?, path)?;

    let mut bars = Vec::new();
    let mut invalid_count = 0;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.context(format!("Failed to read row {}", row_idx + 1))?;

        let dt_str = record.get(columns.datetime).context("Missing datetime column")?;
        let timestamp = parse_timestamp(dt_str).context(format!("Row {}", row_idx + 2))?;

        let high = parse_price(&record, columns.high, "high")?;
        let low = parse_price(&record, columns.low, "low")?;
        let close = parse_price(&record, columns.close, "close")?;
        let (Some(high), Some(low), Some(close)) = (high, low, close) else {
            invalid_count += 1;
            warn!("Skipping row {} with empty prices ({})", row_idx + 2, timestamp);
            continue;
        };
        let open = match columns.open {
            Some(idx) => parse_price(&record, idx, "open")?.unwrap_or(close),
            None => close,
        };
        let volume = match columns.volume {
            Some(idx) => parse_price(&record, idx, "volume")?.unwrap_or(0.0),
            None => 0.0,
        };

        match Bar::new(timestamp, open, high, low, close, volume) {
            Ok(bar) => bars.push(bar),
            Err(e) => {
                invalid_count += 1;
                warn!(
                    "Skipping invalid bar at row {} in {:?}: {}",
                    row_idx + 2, // +2 for 1-indexed and header row
                    path.file_name().unwrap_or_default(),
                    e
                );
            }
        }
    }

    if invalid_count > 0 {
        warn!(
            "Skipped {} invalid bars out of {} in {:?}",
            invalid_count,
            invalid_count + bars.len(),
            path.file_name().unwrap_or_default()
        );
    }

    if bars.is_empty() {
        return Err(DataError::Empty(path.to_path_buf()).into());
    }

    normalize(&mut bars, path);
    info!("Loaded {} bars from {}", bars.len(), path.display());

    Ok(bars)
}

/// Sort by timestamp and drop duplicate timestamps (first row wins)
fn normalize(bars: &mut Vec<Bar>, path: &Path) {
    if !bars.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        warn!("Bars in {} are not in chronological order, sorting", path.display());
        bars.sort_by_key(|b| b.timestamp);
    }

    let before = bars.len();
    bars.dedup_by_key(|b| b.timestamp);
    if bars.len() < before {
        warn!(
            "Dropped {} duplicate timestamps in {}",
            before - bars.len(),
            path.display()
        );
    }
}

/// Save bars to CSV in the same layout `load_csv` reads
pub fn save_csv(bars: &[Bar], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let mut writer = csv::Writer::from_path(path).context("Failed to create CSV file")?;
    writer.write_record(["Datetime", "Open", "High", "Low", "Close", "Volume"])?;

    for bar in bars {
        writer.write_record(&[
            bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Filter bars by date range (both ends inclusive)
pub fn filter_bars_by_date(
    bars: Vec<Bar>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<Bar> {
    bars.into_iter()
        .filter(|b| {
            let after_start = start.map_or(true, |s| b.timestamp >= s);
            let before_end = end.map_or(true, |e| b.timestamp <= e);
            after_start && before_end
        })
        .collect()
}

/// Locate an input file given by name: as given, then in the parent directory
pub fn resolve_input_path(name: impl AsRef<Path>) -> PathBuf {
    let name = name.as_ref();
    if name.is_file() || name.is_absolute() {
        return name.to_path_buf();
    }

    let in_parent = Path::new("..").join(name);
    if in_parent.is_file() {
        info!("Using {} from parent directory", in_parent.display());
        return in_parent;
    }

    name.to_path_buf()
}
