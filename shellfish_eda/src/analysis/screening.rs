//! Screening lists for manual inspection.
//!
//! Membrane-filtration counts are whole numbers and the detection limit sits
//! near 2, so values at or below a low threshold and values with a
//! fractional part are worth looking at row by row.

use crate::model::*;
use chrono::NaiveDate;
use serde::Serialize;

/// A sample row surfaced by a screening query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedRow {
    pub line: u64,
    pub site: String,
    pub sdate: NaiveDate,
    pub value: f64,
    pub censor: CensorState,
}

/// Values at or below `threshold`, in input order.
pub fn low_values(values: &[f64], threshold: f64) -> Vec<f64> {
    values.iter().copied().filter(|v| *v <= threshold).collect()
}

/// Values with a non-zero fractional part, in input order.
pub fn non_integer_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.fract() != 0.0).collect()
}

fn flagged_rows(table: &SampleTable, keep: impl Fn(f64) -> bool) -> Vec<FlaggedRow> {
    table
        .samples
        .iter()
        .filter_map(|s| {
            let value = s.coli_val?;
            keep(value).then(|| FlaggedRow {
                line: s.line,
                site: s.site.clone(),
                sdate: s.sdate,
                value,
                censor: s.censor_state(),
            })
        })
        .collect()
}

pub fn low_value_rows(table: &SampleTable, threshold: f64) -> Vec<FlaggedRow> {
    flagged_rows(table, |v| v <= threshold)
}

pub fn non_integer_rows(table: &SampleTable) -> Vec<FlaggedRow> {
    flagged_rows(table, |v| v.fract() != 0.0)
}
