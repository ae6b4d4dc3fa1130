//! Geometric means.
//!
//! The geometric mean is the regulatory summary statistic for growing-area
//! classification. It is computed as exp(mean(ln x)), which is only defined
//! for strictly positive values; anything else is an error rather than a
//! silently dropped row.

use crate::error::ReportError;
use crate::model::SampleTable;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub grow_area: String,
    pub year: i32,
    /// Number of non-missing values in the group.
    pub n: usize,
    pub geometric_mean: f64,
}

pub fn geometric_mean(values: &[f64]) -> Result<f64, ReportError> {
    if values.is_empty() {
        return Err(ReportError::GeometricMean {
            reason: "no values".to_string(),
        });
    }
    if let Some(bad) = values.iter().find(|v| !(**v > 0.0)) {
        return Err(ReportError::GeometricMean {
            reason: format!("non-positive value {}", bad),
        });
    }
    let mean_log = values.iter().map(|v| v.ln()).sum::<f64>() / values.len() as f64;
    Ok(mean_log.exp())
}

/// Geometric mean of non-missing `ColiVal` for each (growing area, year),
/// ordered by area then year.
///
/// Fails with a `Domain` error naming the first offending row if any
/// included value is non-positive.
pub fn geometric_means_by_area_year(table: &SampleTable) -> Result<Vec<GroupMean>, ReportError> {
    let mut groups: BTreeMap<(String, i32), Vec<f64>> = BTreeMap::new();
    for s in &table.samples {
        let Some(value) = s.coli_val else { continue };
        if !(value > 0.0) {
            return Err(ReportError::Domain {
                row: s.line,
                column: crate::model::COL_COLI.to_string(),
                value: value.to_string(),
                reason: "geometric mean requires positive values".to_string(),
            });
        }
        groups
            .entry((s.grow_area.clone(), s.year))
            .or_default()
            .push(value);
    }

    groups
        .into_iter()
        .map(|((grow_area, year), values)| {
            Ok(GroupMean {
                grow_area,
                year,
                n: values.len(),
                geometric_mean: geometric_mean(&values)?,
            })
        })
        .collect()
}
