//! Capture the shard distributor run configuration as LaTeX and JSON
//! artifacts, merging the structured config file, the startenv defaults, and
//! explicit overrides.

use shardscope::runconfig::{self, ConfigOverrides, ConfigRecord};
use shardscope::{telemetry, Result};

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Shard distributor run-config capture
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Structured config file to scrape
    #[arg(long, default_value = "config/development.yaml")]
    config: PathBuf,

    /// Shell-style env defaults file to scrape
    #[arg(long, default_value = "startenv.bash")]
    startenv: PathBuf,

    /// Target namespace (config file spelling, dashes)
    #[arg(long, default_value = "shard-distributor-replay")]
    namespace: String,

    /// LaTeX table output path
    #[arg(long, default_value = "plots/run_config.tex")]
    out: PathBuf,

    /// Optional JSON output path
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Override: executor count
    #[arg(long)]
    executors: Option<String>,

    /// Override: replay speed
    #[arg(long)]
    replay_speed: Option<String>,

    /// Override: replay CSV path
    #[arg(long)]
    replay_csv: Option<String>,

    /// Run start bound to record
    #[arg(long)]
    start: Option<String>,

    /// Run end bound to record
    #[arg(long)]
    end: Option<String>,

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

    let structured = runconfig::scrape_structured_config(&args.config, &args.namespace)?;
    let env = runconfig::scrape_env_defaults(&args.startenv)?;
    let overrides = ConfigOverrides {
        executors: args.executors,
        replay_speed: args.replay_speed,
        replay_csv: args.replay_csv,
        start: args.start,
        end: args.end,
    };

    let record = ConfigRecord::resolve(&args.namespace, &structured, &env, &overrides);
    record.write_tex(&args.out)?;
    info!("wrote {}", args.out.display());

    if let Some(json_out) = &args.json_out {
        record.write_json(json_out)?;
        info!("wrote {}", json_out.display());
    }
    Ok(())
}
