//! Generate per-run charts from exported CSV tables.

use shardscope::render::{self, AxisMode};
use shardscope::{telemetry, Result};

use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// Shard distributor run plotter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the exported CSV tables
    #[arg(long)]
    run_dir: PathBuf,

    /// Output directory for figures (defaults to run-dir)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output format (png or svg)
    #[arg(long, default_value = "png")]
    format: String,

    /// Optional title prefix for figures
    #[arg(long)]
    title: Option<String>,

    /// X-axis mode: elapsed minutes since start, or timestamps
    #[arg(long, default_value = "elapsed")]
    x_axis: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    telemetry::init(&args.log_level)?;

    let out_dir = args.out_dir.unwrap_or_else(|| args.run_dir.clone());
    let axis: AxisMode = args.x_axis.parse()?;
    let written = render::render_run(
        &args.run_dir,
        &out_dir,
        &args.format,
        args.title.as_deref(),
        axis,
    )?;

    if written.is_empty() {
        warn!("no charts written from {}", args.run_dir.display());
    }
    Ok(())
}
