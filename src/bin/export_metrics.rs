//! Export shard distributor metrics from Prometheus to CSV tables.
//!
//! One table per catalog entry; failed queries are collected and reported
//! together after the full pass, with successful tables left in place.

use shardscope::catalog::LabelSet;
use shardscope::export::Exporter;
use shardscope::window::{parse_utc, TimeWindow};
use shardscope::{telemetry, Result};

use clap::Parser;

/// Shard distributor metrics exporter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Prometheus base URL
    #[arg(long, default_value = "http://localhost:9090")]
    prom_url: String,

    /// Namespace label value
    #[arg(long, default_value = "shard_distributor_replay")]
    namespace: String,

    /// Namespace type label value
    #[arg(long, default_value = "fixed")]
    namespace_type: String,

    /// Operation label value
    #[arg(long, default_value = "ShardAssignLoop")]
    operation: String,

    /// UTC start time (e.g. 2025-12-02T18:44:15Z); defaults with --end absent
    /// to the last hour
    #[arg(long)]
    start: Option<String>,

    /// UTC end time (e.g. 2025-12-02T20:08:00Z)
    #[arg(long)]
    end: Option<String>,

    /// Query resolution step (e.g. 60s)
    #[arg(long, default_value = "60s")]
    step: String,

    /// Range-vector window for increase/max_over_time (e.g. 1m)
    #[arg(long, default_value = "1m")]
    window: String,

    /// Output directory for CSV tables
    #[arg(long, default_value = "plots")]
    out_dir: String,

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

    let start = args.start.as_deref().map(parse_utc).transpose()?;
    let end = args.end.as_deref().map(parse_utc).transpose()?;
    let window = TimeWindow::infer(start, end, args.step, args.window)?;
    let labels = LabelSet::new(args.namespace, args.namespace_type, args.operation);

    let exporter = Exporter::new(&args.prom_url)?;
    let report = exporter.export(&window, &labels, args.out_dir.as_ref());
    report.into_result()?;
    Ok(())
}
