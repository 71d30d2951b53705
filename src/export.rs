//! Time-series export: run every catalog query, write every result, decide
//! success only after the full pass.

use crate::catalog::{self, LabelSet};
use crate::prom::PromClient;
use crate::series;
use crate::window::TimeWindow;
use crate::{Error, Result};

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome for one catalog entry.
#[derive(Debug)]
pub struct SeriesOutcome {
    pub name: &'static str,
    /// Written path and row count on success, failure message otherwise.
    pub outcome: std::result::Result<(PathBuf, usize), String>,
}

/// Every catalog entry's outcome, in catalog order.
///
/// Successes are already durably written even when the report as a whole
/// signals failure.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub outcomes: Vec<SeriesOutcome>,
}

impl ExportReport {
    pub fn failures(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| o.outcome.as_ref().err())
            .cloned()
            .collect()
    }

    pub fn written(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| o.outcome.as_ref().ok().map(|(p, _)| p.as_path()))
            .collect()
    }

    /// Overall stage result: failure if any catalog entry failed, carrying
    /// every collected message.
    pub fn into_result(self) -> Result<ExportReport> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(self)
        } else {
            Err(Error::Export(failures))
        }
    }
}

/// Exporter for one backend.
pub struct Exporter {
    client: PromClient,
}

impl Exporter {
    pub fn new(prom_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: PromClient::new(prom_url)?,
        })
    }

    /// Export the whole catalog into `out_dir`, one CSV table per entry.
    ///
    /// Never aborts early: each query's failure is collected and the
    /// remaining entries still run. A query matching nothing writes a
    /// header-only table and counts as success.
    pub fn export(&self, window: &TimeWindow, labels: &LabelSet, out_dir: &Path) -> ExportReport {
        let mut report = ExportReport::default();

        for (name, query) in catalog::queries(labels, &window.window) {
            let outcome = self.export_one(name, &query, window, out_dir);
            match &outcome {
                Ok((path, rows)) => info!(series = name, rows = *rows, "wrote {}", path.display()),
                Err(msg) => warn!(series = name, "export failed: {msg}"),
            }
            report.outcomes.push(SeriesOutcome { name, outcome });
        }

        report
    }

    fn export_one(
        &self,
        name: &str,
        query: &str,
        window: &TimeWindow,
        out_dir: &Path,
    ) -> std::result::Result<(PathBuf, usize), String> {
        let result = self
            .client
            .query_range(query, window)
            .map_err(|e| format!("{name}: {e}"))?;

        if result.len() > 1 {
            // Single series per catalog entry is the intent; keep the first
            // but make the truncation visible.
            warn!(
                series = name,
                matched = result.len(),
                "query matched multiple series, keeping the first"
            );
        }

        let samples: Vec<(DateTime<Utc>, String)> = result
            .into_iter()
            .next()
            .map(|s| s.values)
            .unwrap_or_default()
            .into_iter()
            .map(|(ts, value)| (truncate_to_second(ts), value))
            .collect();

        let path = out_dir.join(format!("{name}.csv"));
        series::write_table(&path, &samples).map_err(|e| format!("{name}: {e}"))?;
        let rows = samples.len();
        Ok((path, rows))
    }
}

/// Backend timestamps are fractional seconds since epoch; storage is at
/// one-second resolution.
fn truncate_to_second(ts: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts as i64, 0).unwrap_or_default()
}
