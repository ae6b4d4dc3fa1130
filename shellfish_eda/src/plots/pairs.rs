//! Pairwise relationship grid.
//!
//! Rows and columns are log10 `ColiVal`, `Temp`, `Sal` and `DOY`. Diagonal
//! panels hold each variable's histogram; off-diagonal panels plot the row
//! variable against the column variable with a LOWESS trend.

use super::histogram::{DEFAULT_BINS, draw_bars, histogram};
use super::smoothing::{DEFAULT_SPAN, lowess_curve};
use super::{padded_range, render_err};
use crate::error::ReportError;
use crate::model::{NumericColumn, Sample, SampleTable};
use plotters::prelude::*;
use std::path::Path;

pub const PAIR_COLUMNS: [NumericColumn; 4] = [
    NumericColumn::Coli,
    NumericColumn::Temp,
    NumericColumn::Sal,
    NumericColumn::Doy,
];

const PANEL_PX: u32 = 280;

/// Value of `column` as plotted: `ColiVal` goes on a log10 axis, so
/// non-positive counts have no position.
pub fn plotted_value(column: NumericColumn, sample: &Sample) -> Option<f64> {
    let v = column.value(sample)?;
    match column {
        NumericColumn::Coli => (v > 0.0).then(|| v.log10()),
        _ => Some(v),
    }
}

pub fn axis_label(column: NumericColumn) -> String {
    match column {
        NumericColumn::Coli => "log10(ColiVal)".to_string(),
        other => other.label().to_string(),
    }
}

/// (x, y) pairs for a panel, from rows where both values are plottable.
pub fn panel_points(table: &SampleTable, x: NumericColumn, y: NumericColumn) -> Vec<(f64, f64)> {
    table
        .samples
        .iter()
        .filter_map(|s| Some((plotted_value(x, s)?, plotted_value(y, s)?)))
        .collect()
}

pub fn render_pairs(table: &SampleTable, path: &Path) -> Result<bool, ReportError> {
    let chart = "pairs";
    let k = PAIR_COLUMNS.len();
    let side = PANEL_PX * k as u32;

    let root = SVGBackend::new(path, (side, side)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err(chart))?;
    let panels = root.split_evenly((k, k));

    for (idx, panel) in panels.iter().enumerate() {
        let row = PAIR_COLUMNS[idx / k];
        let col = PAIR_COLUMNS[idx % k];

        if row == col {
            let values: Vec<f64> = table.samples.iter().filter_map(|s| plotted_value(row, s)).collect();
            let bins = histogram(&values, DEFAULT_BINS);
            draw_bars(panel, &bins, &axis_label(row), &axis_label(row), chart)?;
            continue;
        }

        let points = panel_points(table, col, row);
        let (Some(x_range), Some(y_range)) = (
            padded_range(points.iter().map(|p| p.0)),
            padded_range(points.iter().map(|p| p.1)),
        ) else {
            continue;
        };

        let mut builder = ChartBuilder::on(panel)
            .margin(6)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(x_range, y_range)
            .map_err(render_err(chart))?;

        builder
            .configure_mesh()
            .disable_mesh()
            .x_desc(axis_label(col))
            .y_desc(axis_label(row))
            .draw()
            .map_err(render_err(chart))?;

        builder
            .draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 2, BLUE.mix(0.4).filled())))
            .map_err(render_err(chart))?;

        let trend = lowess_curve(&points, DEFAULT_SPAN);
        if trend.len() > 1 {
            builder
                .draw_series(LineSeries::new(trend, RED.stroke_width(2)))
                .map_err(render_err(chart))?;
        }
    }

    root.present().map_err(render_err(chart))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::*;

    #[test]
    fn test_coli_is_plotted_on_log10_axis() {
        let s = sample(2, "WH001.00", "WH", "2016-02-01", Some(100.0));
        assert_eq!(plotted_value(NumericColumn::Coli, &s), Some(2.0));
        assert_eq!(plotted_value(NumericColumn::Doy, &s), Some(32.0));
        assert_eq!(plotted_value(NumericColumn::Temp, &s), None);
    }

    #[test]
    fn test_panel_points_need_both_values() {
        let mut a = sample(2, "WH001.00", "WH", "2016-02-01", Some(10.0));
        a.temp = Some(4.0);
        let mut b = sample(3, "WH001.00", "WH", "2016-06-01", Some(0.0));
        b.temp = Some(15.0);
        let c = sample(4, "WH001.00", "WH", "2016-08-01", Some(100.0));
        let points = panel_points(&table(vec![a, b, c]), NumericColumn::Temp, NumericColumn::Coli);
        assert_eq!(points, vec![(4.0, 1.0)]);
    }

    #[test]
    fn test_axis_labels() {
        assert_eq!(axis_label(NumericColumn::Coli), "log10(ColiVal)");
        assert_eq!(axis_label(NumericColumn::Sal), "Sal");
    }
}
