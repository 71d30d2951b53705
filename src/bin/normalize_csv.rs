//! Normalize CSV timestamps to YYYY-MM-DD HH:MM:SS.

use shardscope::normalize;
use shardscope::{telemetry, Error, Result};

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// CSV timestamp normalizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV
    #[arg(long = "in")]
    input: PathBuf,

    /// Output CSV
    #[arg(long = "out")]
    output: PathBuf,

    /// CSV delimiter
    #[arg(long, default_value = ",")]
    delimiter: String,

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

    let delimiter = match args.delimiter.as_bytes() {
        [byte] => *byte,
        _ => {
            return Err(Error::Config(format!(
                "delimiter must be a single byte, got '{}'",
                args.delimiter
            )))
        }
    };

    normalize::normalize_timestamps(&args.input, &args.output, delimiter)?;
    info!("wrote {}", args.output.display());
    Ok(())
}
