//! Distinct `ColiVal` values and their censoring.
//!
//! Reported values cluster at detection and counting limits. Listing each
//! distinct value with whether any row at that value was flagged makes the
//! limits (and inconsistent flag coding) visible.

use crate::model::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistinctValue {
    pub value: f64,
    pub count: usize,
    /// True if any row with this value has `LCFlag` or `RCFlag` set.
    pub censored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CensorCount {
    pub state: CensorState,
    pub count: usize,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Distinct non-missing `ColiVal` values in ascending order.
pub fn distinct_values(table: &SampleTable) -> Vec<DistinctValue> {
    let mut pairs: Vec<(f64, bool)> = table
        .samples
        .iter()
        .filter_map(|s| s.coli_val.map(|v| (v, s.is_censored())))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out: Vec<DistinctValue> = Vec::new();
    for (value, censored) in pairs {
        match out.last_mut() {
            Some(last) if last.value == value => {
                last.count += 1;
                last.censored |= censored;
            }
            _ => out.push(DistinctValue {
                value,
                count: 1,
                censored,
            }),
        }
    }
    out
}

/// Row counts and value ranges for each censoring state, including states
/// with no rows.
pub fn censoring_summary(table: &SampleTable) -> Vec<CensorCount> {
    CensorState::ALL
        .iter()
        .map(|&state| {
            let rows: Vec<&Sample> = table
                .samples
                .iter()
                .filter(|s| s.coli_val.is_some() && s.censor_state() == state)
                .collect();
            let values = rows.iter().filter_map(|s| s.coli_val);
            CensorCount {
                state,
                count: rows.len(),
                min_value: values.clone().reduce(f64::min),
                max_value: values.reduce(f64::max),
            }
        })
        .collect()
}
