/// Exploratory figures for the shellfish report.
///
/// Every renderer borrows the normalized table and writes one SVG file. The
/// figures are presentation only: nothing here feeds back into a reported
/// statistic. Bin, point and smoothing computations are plain functions so
/// they can be tested without rendering.
///
/// Submodules:
/// - `scatter` — `ColiVal` over time, coloured by censoring state.
/// - `histogram` — log10 histograms with linear and log count axes.
/// - `pairs` — pairwise grid with LOWESS trends.
/// - `smoothing` — the LOWESS smoother.

pub mod histogram;
pub mod pairs;
pub mod scatter;
pub mod smoothing;

use crate::error::ReportError;
use crate::logging::{self, Stage};
use crate::model::SampleTable;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Size of single-chart figures, in pixels.
pub const FIGURE_SIZE: (u32, u32) = (1024, 640);

type Renderer = fn(&SampleTable, &Path) -> Result<bool, ReportError>;

/// Figures in the order they are produced.
pub const FIGURES: &[(&str, Renderer)] = &[
    ("coli_over_time.svg", scatter::render_time_scatter),
    ("coli_log_histogram.svg", histogram::render_log_histogram),
    ("coli_loglog_histogram.svg", histogram::render_loglog_histogram),
    ("pairs.svg", pairs::render_pairs),
];

pub(crate) fn render_err<E: std::fmt::Display>(chart: &str) -> impl Fn(E) -> ReportError + '_ {
    move |e| ReportError::Render {
        chart: chart.to_string(),
        reason: e.to_string(),
    }
}

/// Range covering `values` with 5% padding on each side; a single distinct
/// value gets ±0.5. `None` when there are no finite values.
pub fn padded_range(values: impl Iterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    if min == max {
        return Some(min - 0.5..max + 0.5);
    }
    let pad = (max - min) * 0.05;
    Some(min - pad..max + pad)
}

/// Render every figure into `dir`, creating it if needed. Returns the paths
/// written; skipped (empty) charts are not included.
pub fn render_all(table: &SampleTable, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(dir).map_err(|e| ReportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::new();
    for &(file_name, render) in FIGURES {
        let path = dir.join(file_name);
        if render(table, &path)? {
            logging::debug(Stage::Visualizer, Some(file_name), "written");
            written.push(path);
        }
    }

    logging::info(
        Stage::Visualizer,
        Some(&dir.display().to_string()),
        &format!("Wrote {} of {} figures", written.len(), FIGURES.len()),
    );
    Ok(written)
}
