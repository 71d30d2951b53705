//! Chart rendering: align exported series onto a shared time axis and draw
//! the two fixed chart groups.
//!
//! Group layout mirrors what operators compare between runs: "imbalance"
//! (max-over-mean and coefficient-of-variation, smoothed vs reported, two
//! stacked panels) and "churn" (moves per window and average moves per cycle).
//! Both panels of a group share one x range and one time origin.

use crate::series::{self, SamplePoint};
use crate::{Error, Result};

use chrono::{DateTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

const SMOOTHED_COLOR: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);
const REPORTED_COLOR: RGBColor = RGBColor(0xf2, 0xc8, 0x4b);
const MOVES_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const AVG_MOVES_COLOR: RGBColor = RGBColor(0x94, 0x67, 0xbd);

const FIGURE_SIZE: (u32, u32) = (1000, 600);

/// X-axis mode: minutes elapsed since the group's earliest sample, or raw
/// timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisMode {
    Elapsed,
    Timestamp,
}

impl FromStr for AxisMode {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "elapsed" => Ok(AxisMode::Elapsed),
            "timestamp" => Ok(AxisMode::Timestamp),
            other => Err(Error::Config(format!(
                "invalid x-axis mode '{other}', expected elapsed or timestamp"
            ))),
        }
    }
}

/// One named series slot inside a panel.
struct SeriesSpec {
    file_stem: &'static str,
    label: &'static str,
    color: RGBColor,
}

/// One stacked panel: fixed title, fixed series slots.
struct PanelSpec {
    title: &'static str,
    series: &'static [SeriesSpec],
    legend: bool,
}

/// One chart group, rendered to `<name>.<format>`.
struct GroupSpec {
    name: &'static str,
    panels: [PanelSpec; 2],
}

const IMBALANCE: GroupSpec = GroupSpec {
    name: "imbalance",
    panels: [
        PanelSpec {
            title: "Imbalance (Max/Mean)",
            series: &[
                SeriesSpec {
                    file_stem: "smoothed_max_over_mean",
                    label: "smoothed",
                    color: SMOOTHED_COLOR,
                },
                SeriesSpec {
                    file_stem: "reported_max_over_mean",
                    label: "reported",
                    color: REPORTED_COLOR,
                },
            ],
            legend: true,
        },
        PanelSpec {
            title: "Imbalance (CV)",
            series: &[
                SeriesSpec {
                    file_stem: "smoothed_cv",
                    label: "smoothed",
                    color: SMOOTHED_COLOR,
                },
                SeriesSpec {
                    file_stem: "reported_cv",
                    label: "reported",
                    color: REPORTED_COLOR,
                },
            ],
            legend: true,
        },
    ],
};

const CHURN: GroupSpec = GroupSpec {
    name: "churn",
    panels: [
        PanelSpec {
            title: "Moves per Window",
            series: &[SeriesSpec {
                file_stem: "moves_per_window",
                label: "moves",
                color: MOVES_COLOR,
            }],
            legend: false,
        },
        PanelSpec {
            title: "Avg Moves per Cycle",
            series: &[SeriesSpec {
                file_stem: "avg_moves_per_cycle",
                label: "avg moves",
                color: AVG_MOVES_COLOR,
            }],
            legend: false,
        },
    ],
};

/// Render both chart groups from the tables in `run_dir` into `out_dir`.
///
/// A group whose series are all empty is skipped with a warning rather than
/// rendered blank. Returns the paths actually written.
pub fn render_run(
    run_dir: &Path,
    out_dir: &Path,
    format: &str,
    title: Option<&str>,
    axis: AxisMode,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for group in [&IMBALANCE, &CHURN] {
        if let Some(path) = render_group(group, run_dir, out_dir, format, title, axis)? {
            info!(group = group.name, "wrote {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}

/// Loaded data for one panel: `(label, color, points)` per series slot.
type PanelData = Vec<(&'static str, RGBColor, Vec<SamplePoint>)>;

fn render_group(
    group: &GroupSpec,
    run_dir: &Path,
    out_dir: &Path,
    format: &str,
    title: Option<&str>,
    axis: AxisMode,
) -> Result<Option<PathBuf>> {
    let panels: Vec<PanelData> = group
        .panels
        .iter()
        .map(|panel| {
            panel
                .series
                .iter()
                .map(|spec| {
                    let points = series::load_table(&run_dir.join(format!("{}.csv", spec.file_stem)))?;
                    Ok((spec.label, spec.color, points))
                })
                .collect::<Result<PanelData>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let all_series: Vec<&[SamplePoint]> = panels
        .iter()
        .flat_map(|p| p.iter().map(|(_, _, points)| points.as_slice()))
        .collect();
    let Some(base) = series::base_time(&all_series) else {
        warn!(group = group.name, "no series found, skipping chart");
        return Ok(None);
    };

    let out_path = out_dir.join(format!("{}.{}", group.name, format));
    match format {
        "png" => {
            let root = BitMapBackend::new(&out_path, FIGURE_SIZE).into_drawing_area();
            draw_group(root, group, &panels, base, axis, title)?;
        }
        "svg" => {
            let root = SVGBackend::new(&out_path, FIGURE_SIZE).into_drawing_area();
            draw_group(root, group, &panels, base, axis, title)?;
        }
        other => {
            return Err(Error::Render(format!(
                "unsupported output format '{other}', expected png or svg"
            )));
        }
    }

    Ok(Some(out_path))
}

fn draw_group<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    group: &GroupSpec,
    panels: &[PanelData],
    base: DateTime<Utc>,
    axis: AxisMode,
    title: Option<&str>,
) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;
    let root = match title {
        Some(title) if !title.is_empty() => {
            root.titled(title, ("sans-serif", 22)).map_err(render_err)?
        }
        _ => root,
    };

    // One x range across both panels so they stay visually aligned
    let xs: Vec<f64> = panels
        .iter()
        .flatten()
        .flat_map(|(_, _, points)| points.iter().map(|p| x_value(p.ts, base, axis)))
        .collect();
    let x_range = padded_range(&xs, 0.5);

    let areas = root.split_evenly((2, 1));
    for (idx, (spec, data)) in group.panels.iter().zip(panels.iter()).enumerate() {
        let ys: Vec<f64> = data
            .iter()
            .flat_map(|(_, _, points)| points.iter().map(|p| p.value))
            .collect();
        let y_range = padded_range(&ys, 0.1);

        let mut chart = ChartBuilder::on(&areas[idx])
            .caption(spec.title, ("sans-serif", 16))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(55)
            .build_cartesian_2d(x_range.clone(), y_range)
            .map_err(render_err)?;

        let bottom = idx == group.panels.len() - 1;
        let x_desc = match (bottom, axis) {
            (false, _) => "",
            (true, AxisMode::Elapsed) => "minutes since start",
            (true, AxisMode::Timestamp) => "timestamp",
        };
        chart
            .configure_mesh()
            .light_line_style(BLACK.mix(0.08))
            .bold_line_style(BLACK.mix(0.2))
            .x_desc(x_desc)
            .x_label_formatter(&move |x: &f64| format_x(*x, axis))
            .draw()
            .map_err(render_err)?;

        for (label, color, points) in data {
            if points.is_empty() {
                continue;
            }
            let color = *color;
            let line: Vec<(f64, f64)> = points
                .iter()
                .map(|p| (x_value(p.ts, base, axis), p.value))
                .collect();
            let drawn = chart
                .draw_series(LineSeries::new(line, color.stroke_width(2)))
                .map_err(render_err)?;
            if spec.legend {
                drawn.label(*label).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
                });
            }
        }

        if spec.legend {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK.mix(0.4))
                .draw()
                .map_err(render_err)?;
        }
    }

    root.present().map_err(render_err)?;
    Ok(())
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

fn x_value(ts: DateTime<Utc>, base: DateTime<Utc>, axis: AxisMode) -> f64 {
    match axis {
        AxisMode::Elapsed => series::elapsed_minutes(ts, base),
        AxisMode::Timestamp => ts.timestamp() as f64,
    }
}

fn format_x(x: f64, axis: AxisMode) -> String {
    match axis {
        AxisMode::Elapsed => format!("{x:.0}"),
        AxisMode::Timestamp => DateTime::from_timestamp(x as i64, 0)
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_default(),
    }
}

/// Axis range with a little padding; degenerate or empty input falls back to
/// a unit range so an axis can always be built.
fn padded_range(values: &[f64], min_pad: f64) -> std::ops::Range<f64> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((max - min) * 0.05).max(min_pad);
    (min - pad)..(max + pad)
}
