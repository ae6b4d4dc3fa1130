//! `ColiVal` over time, coloured by censoring state.

use super::{FIGURE_SIZE, padded_range, render_err};
use crate::error::ReportError;
use crate::logging::{self, Stage};
use crate::model::{CensorState, SampleTable};
use plotters::prelude::*;
use std::path::Path;

/// One plotted point: decimal year, value, censoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub x: f64,
    pub y: f64,
    pub state: CensorState,
}

/// Points for the time scatter: rows with a positive `ColiVal`.
pub fn time_points(table: &SampleTable) -> Vec<TimePoint> {
    table
        .samples
        .iter()
        .filter_map(|s| {
            let y = s.coli_val.filter(|v| *v > 0.0)?;
            Some(TimePoint {
                x: s.decimal_year(),
                y,
                state: s.censor_state(),
            })
        })
        .collect()
}

pub fn state_color(state: CensorState) -> RGBColor {
    match state {
        CensorState::Uncensored => RGBColor(31, 119, 180),
        CensorState::Left => RGBColor(44, 160, 44),
        CensorState::Right => RGBColor(214, 39, 40),
        CensorState::Both => RGBColor(148, 103, 189),
    }
}

pub fn render_time_scatter(table: &SampleTable, path: &Path) -> Result<bool, ReportError> {
    let chart = "time scatter";
    let points = time_points(table);
    let Some(x_range) = padded_range(points.iter().map(|p| p.x)) else {
        logging::warn(Stage::Visualizer, Some(chart), "no positive ColiVal values, chart skipped");
        return Ok(false);
    };
    let y_min = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err(chart))?;

    let mut builder = ChartBuilder::on(&root)
        .caption("E. coli by sample date", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, (y_min / 1.5..y_max * 1.5).log_scale())
        .map_err(render_err(chart))?;

    builder
        .configure_mesh()
        .x_desc("Year")
        .y_desc("ColiVal (log scale)")
        .x_label_formatter(&|x| format!("{:.1}", x))
        .draw()
        .map_err(render_err(chart))?;

    for state in CensorState::ALL {
        let color = state_color(state);
        let subset: Vec<&TimePoint> = points.iter().filter(|p| p.state == state).collect();
        if subset.is_empty() {
            continue;
        }
        builder
            .draw_series(subset.iter().map(|p| Circle::new((p.x, p.y), 3, color.filled())))
            .map_err(render_err(chart))?
            .label(format!("{} ({})", state.label(), subset.len()))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    builder
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err(chart))?;

    root.present().map_err(render_err(chart))?;
    Ok(true)
}
