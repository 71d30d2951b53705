//! # Shardscope
//!
//! Per-run visual reports for a shard distributor deployment.
//!
//! A "run" is one observation window of the distributor, identified by a run
//! id and owning one output directory. The pipeline has three stages:
//!
//! - **Export**: a fixed catalog of Prometheus range queries, each written as
//!   a two-column `timestamp,value` CSV table
//! - **Config capture**: scrape the distributor's structured config file and
//!   shell-style env defaults into a flat run-config record
//! - **Render**: align the exported series onto a shared time axis and draw
//!   grouped line charts
//!
//! Each stage is a standalone binary (`export_metrics`, `render_config`,
//! `plot_run`); `run_pipeline` sequences all three against one run directory.
//!
//! Everything is synchronous and single-threaded: backend queries block, file
//! I/O blocks, and no two pipeline invocations may share a run directory.

pub mod catalog;
pub mod error;
pub mod export;
pub mod normalize;
pub mod pipeline;
pub mod prom;
pub mod render;
pub mod runconfig;
pub mod series;
pub mod telemetry;
pub mod window;

pub use error::{Error, Result};
