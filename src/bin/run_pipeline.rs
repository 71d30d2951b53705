//! Run the whole report pipeline for one run id: config capture, metrics
//! export, and chart rendering into one output directory.

use shardscope::catalog::LabelSet;
use shardscope::pipeline::{self, PipelineOptions};
use shardscope::render::AxisMode;
use shardscope::runconfig::ConfigOverrides;
use shardscope::window::{parse_utc, TimeWindow};
use shardscope::{telemetry, Result};

use clap::Parser;
use std::path::PathBuf;

/// Shard distributor run report pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run identifier (e.g. runA)
    #[arg(long)]
    run_id: String,

    /// UTC start time (ISO-8601); defaults with --end absent to the last hour
    #[arg(long)]
    start: Option<String>,

    /// UTC end time (ISO-8601)
    #[arg(long)]
    end: Option<String>,

    /// Root output directory; the run writes into <out-root>/<run-id>
    #[arg(long, default_value = "plots")]
    out_root: PathBuf,

    /// Prometheus base URL
    #[arg(long, default_value = "http://localhost:9090")]
    prom_url: String,

    /// Namespace label value (metrics spelling, underscores)
    #[arg(long, default_value = "shard_distributor_replay")]
    namespace: String,

    /// Namespace type label value
    #[arg(long, default_value = "fixed")]
    namespace_type: String,

    /// Operation label value
    #[arg(long, default_value = "ShardAssignLoop")]
    operation: String,

    /// Query resolution step (e.g. 60s)
    #[arg(long, default_value = "60s")]
    step: String,

    /// Range-vector window (e.g. 1m)
    #[arg(long, default_value = "1m")]
    window: String,

    /// Figure title (defaults to the run id)
    #[arg(long)]
    title: Option<String>,

    /// Chart output format (png or svg)
    #[arg(long, default_value = "png")]
    format: String,

    /// X-axis mode: elapsed or timestamp
    #[arg(long, default_value = "elapsed")]
    x_axis: String,

    /// Structured config file to scrape
    #[arg(long, default_value = "config/development.yaml")]
    config: PathBuf,

    /// Shell-style env defaults file to scrape
    #[arg(long, default_value = "startenv.bash")]
    startenv: PathBuf,

    /// Override: executor count recorded in the run config
    #[arg(long)]
    executors: Option<String>,

    /// Override: replay speed recorded in the run config
    #[arg(long)]
    replay_speed: Option<String>,

    /// Override: replay CSV path recorded in the run config
    #[arg(long)]
    replay_csv: Option<String>,

    /// Reuse a non-empty run directory instead of failing
    #[arg(long)]
    overwrite: bool,

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
    let axis: AxisMode = args.x_axis.parse()?;

    let opts = PipelineOptions {
        run_id: args.run_id,
        out_root: args.out_root,
        overwrite: args.overwrite,
        prom_url: args.prom_url,
        window,
        labels: LabelSet::new(args.namespace, args.namespace_type, args.operation),
        config_path: args.config,
        startenv_path: args.startenv,
        overrides: ConfigOverrides {
            executors: args.executors,
            replay_speed: args.replay_speed,
            replay_csv: args.replay_csv,
            start: None,
            end: None,
        },
        title: args.title,
        format: args.format,
        axis,
    };

    let run_dir = pipeline::run(&opts)?;
    println!("done: {}", run_dir.display());
    Ok(())
}
