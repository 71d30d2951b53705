//! Per-series CSV tables and time-axis alignment.
//!
//! The on-disk format is the interchange contract between the exporter and
//! the renderer: a `timestamp,value` header, then one row per sample with the
//! timestamp at one-second resolution (`YYYY-MM-DD HH:MM:SS`). Loading is
//! tolerant — malformed rows are dropped, missing files yield an empty
//! series — so a partially failed export still renders.

use crate::Result;

use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One loaded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub ts: DateTime<Utc>,
    pub value: f64,
}

/// Write one series table. `samples` carries the backend's raw value tokens
/// so that e.g. `NaN` round-trips into the file unchanged; sub-second
/// precision on timestamps is intentionally discarded. An empty series
/// becomes a header-only file.
pub fn write_table(path: &Path, samples: &[(DateTime<Utc>, String)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["timestamp", "value"])?;
    for (ts, value) in samples {
        writer.write_record([&ts.format(TIMESTAMP_FORMAT).to_string(), value])?;
    }
    writer.flush()?;
    Ok(())
}

/// Load one series table, dropping malformed rows.
///
/// A missing file is an empty series, not an error. Rows with an empty or
/// unparseable timestamp, or an empty, non-numeric, or literal `nan` value,
/// are skipped individually.
pub fn load_table(path: &Path) -> Result<Vec<SamplePoint>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let ts = record.get(0).unwrap_or("").trim();
        let value = record.get(1).unwrap_or("").trim();
        if ts.is_empty() || value.is_empty() || value.eq_ignore_ascii_case("nan") {
            continue;
        }
        let Ok(naive) = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT) else {
            continue;
        };
        let Ok(value) = value.parse::<f64>() else {
            continue;
        };
        points.push(SamplePoint {
            ts: naive.and_utc(),
            value,
        });
    }
    Ok(points)
}

/// Shared time origin for a chart group: the minimum timestamp across all
/// non-empty series. Computed once per group so that every panel shares one
/// origin regardless of per-series start offsets.
pub fn base_time(series_list: &[&[SamplePoint]]) -> Option<DateTime<Utc>> {
    series_list
        .iter()
        .filter_map(|s| s.iter().map(|p| p.ts).min())
        .min()
}

/// Minutes elapsed since the group's base time.
pub fn elapsed_minutes(ts: DateTime<Utc>, base: DateTime<Utc>) -> f64 {
    (ts - base).num_seconds() as f64 / 60.0
}
