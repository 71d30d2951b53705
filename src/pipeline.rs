//! Run orchestration: one output directory per run, three stages in order.
//!
//! The run directory is exclusively owned by one pipeline invocation for its
//! lifetime; nothing enforces that with locks — concurrent runs against the
//! same directory are a caller error. No stage is retried and nothing is
//! rolled back: partial output stays in place so a retry with `overwrite` can
//! start from inspection.

use crate::catalog::LabelSet;
use crate::export::Exporter;
use crate::render::{self, AxisMode};
use crate::runconfig::{self, ConfigOverrides, ConfigRecord};
use crate::window::TimeWindow;
use crate::{Error, Result};

use std::path::{Path, PathBuf};
use tracing::info;

/// Everything one pipeline invocation needs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub run_id: String,
    pub out_root: PathBuf,
    pub overwrite: bool,
    pub prom_url: String,
    pub window: TimeWindow,
    pub labels: LabelSet,
    pub config_path: PathBuf,
    pub startenv_path: PathBuf,
    pub overrides: ConfigOverrides,
    pub title: Option<String>,
    pub format: String,
    pub axis: AxisMode,
}

/// Resolve and prepare `out_root/run_id`.
///
/// Fails with `OutputConflict` before any stage runs when the directory
/// already holds content and `overwrite` is not set; creation itself is
/// idempotent.
pub fn ensure_run_dir(out_root: &Path, run_id: &str, overwrite: bool) -> Result<PathBuf> {
    let run_dir = out_root.join(run_id);
    if run_dir.is_dir() && !overwrite {
        let mut entries = std::fs::read_dir(&run_dir)?;
        if entries.next().is_some() {
            return Err(Error::OutputConflict(run_dir));
        }
    }
    std::fs::create_dir_all(&run_dir)?;
    Ok(run_dir)
}

/// Run config capture, export, and render against one run directory.
///
/// Stages run strictly in sequence; the first hard failure aborts the rest
/// and propagates. Returns the run directory on success.
pub fn run(opts: &PipelineOptions) -> Result<PathBuf> {
    let run_dir = ensure_run_dir(&opts.out_root, &opts.run_id, opts.overwrite)?;
    info!(run_id = %opts.run_id, "run directory: {}", run_dir.display());

    // Stage 1: capture the run configuration. The config file uses the
    // dashed namespace spelling while metrics use underscores.
    let config_namespace = opts.labels.namespace.replace('_', "-");
    let structured = runconfig::scrape_structured_config(&opts.config_path, &config_namespace)?;
    let env = runconfig::scrape_env_defaults(&opts.startenv_path)?;
    let mut overrides = opts.overrides.clone();
    overrides.start.get_or_insert_with(|| opts.window.start_iso());
    overrides.end.get_or_insert_with(|| opts.window.end_iso());
    let record = ConfigRecord::resolve(&config_namespace, &structured, &env, &overrides);
    record.write_tex(&run_dir.join("run_config.tex"))?;
    record.write_json(&run_dir.join("run_config.json"))?;

    // Stage 2: export every catalog series; aggregated failure aborts here
    let exporter = Exporter::new(&opts.prom_url)?;
    exporter.export(&opts.window, &opts.labels, &run_dir).into_result()?;

    // Stage 3: render charts from what stage 2 wrote
    let title = opts.title.clone().unwrap_or_else(|| opts.run_id.clone());
    render::render_run(&run_dir, &run_dir, &opts.format, Some(&title), opts.axis)?;

    info!(run_id = %opts.run_id, "done: {}", run_dir.display());
    Ok(run_dir)
}
