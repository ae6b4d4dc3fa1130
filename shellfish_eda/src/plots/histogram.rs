//! Histograms of `ColiVal` on a log10 value axis.
//!
//! Two figures share the same bins: one with a linear count axis and one
//! with a log count axis (the log-log view), which makes the heavy right
//! tail readable.

use super::{FIGURE_SIZE, render_err};
use crate::error::ReportError;
use crate::logging::{self, Stage};
use crate::model::SampleTable;
use plotters::prelude::*;
use serde::Serialize;
use std::path::Path;

pub const DEFAULT_BINS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins over the range of `values`. Non-finite values are
/// ignored; the maximum lands in the last bin. A constant input gets one
/// bin of width 1 centred on the value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![HistogramBin {
            lower: min - 0.5,
            upper: max + 0.5,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Histogram of log10(`ColiVal`) over the positive non-missing values.
/// Returns the bins and the number of values left out because they are not
/// positive.
pub fn log10_histogram(table: &SampleTable, bins: usize) -> (Vec<HistogramBin>, usize) {
    let values = table.coli_values();
    let logs: Vec<f64> = values.iter().filter(|v| **v > 0.0).map(|v| v.log10()).collect();
    (histogram(&logs, bins), values.len() - logs.len())
}

/// Draws histogram bars into an existing drawing area. Shared with the
/// diagonal panels of the pairs grid.
pub(crate) fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    bins: &[HistogramBin],
    caption: &str,
    x_desc: &str,
    chart: &str,
) -> Result<(), ReportError> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Ok(());
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

    let mut builder = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 16))
        .margin(6)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(first.lower..last.upper, 0.0..max_count * 1.1)
        .map_err(render_err(chart))?;

    builder
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Count")
        .draw()
        .map_err(render_err(chart))?;

    builder
        .draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLUE.mix(0.5).filled())
        }))
        .map_err(render_err(chart))?;

    Ok(())
}

/// log10(`ColiVal`) histogram with a linear count axis.
pub fn render_log_histogram(table: &SampleTable, path: &Path) -> Result<bool, ReportError> {
    let chart = "log histogram";
    let (bins, dropped) = log10_histogram(table, DEFAULT_BINS);
    warn_dropped(dropped);
    if bins.is_empty() {
        logging::warn(Stage::Visualizer, Some(chart), "no positive ColiVal values, chart skipped");
        return Ok(false);
    }

    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err(chart))?;
    draw_bars(&root, &bins, "E. coli, log10 scale", "log10(ColiVal)", chart)?;
    root.present().map_err(render_err(chart))?;
    Ok(true)
}

/// log10(`ColiVal`) histogram with a log count axis. Empty bins are left
/// out since they have no position on a log axis.
pub fn render_loglog_histogram(table: &SampleTable, path: &Path) -> Result<bool, ReportError> {
    let chart = "log-log histogram";
    let (bins, _) = log10_histogram(table, DEFAULT_BINS);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        logging::warn(Stage::Visualizer, Some(chart), "no positive ColiVal values, chart skipped");
        return Ok(false);
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(1) as f64;
    let baseline = 0.5;

    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err(chart))?;

    let mut builder = ChartBuilder::on(&root)
        .caption("E. coli, log10 value vs log count", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first.lower..last.upper, (baseline..max_count * 2.0).log_scale())
        .map_err(render_err(chart))?;

    builder
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("log10(ColiVal)")
        .y_desc("Count (log scale)")
        .draw()
        .map_err(render_err(chart))?;

    builder
        .draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
            Rectangle::new([(b.lower, baseline), (b.upper, b.count as f64)], BLUE.mix(0.5).filled())
        }))
        .map_err(render_err(chart))?;

    root.present().map_err(render_err(chart))?;
    Ok(true)
}

fn warn_dropped(dropped: usize) {
    if dropped > 0 {
        logging::warn(
            Stage::Visualizer,
            Some("ColiVal"),
            &format!("{} non-positive values cannot be shown on a log axis", dropped),
        );
    }
}
