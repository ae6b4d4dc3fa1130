//! Growing-area standards checks.
//!
//! For each site, the most recent samples are summarized the way the
//! classification standards are written: a geometric mean and an estimated
//! 90th percentile from the log-normal approximation,
//! 10^(mean(log10 x) + 1.2816 * sd(log10 x)). The result is compared with
//! the standard of the site's current classification and with the most
//! permissive classification the statistics would support.
//!
//! Censored values enter at their reported value. The check describes the
//! data; it never changes a sample's `Class`.

use crate::analysis::geomean::geometric_mean;
use crate::error::ReportError;
use crate::model::*;
use crate::standards::{best_supported_class, find_standard};
use serde::Serialize;
use std::collections::BTreeMap;

/// Standard normal quantile for the 90th percentile.
const Z_90: f64 = 1.2816;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteStandardsCheck {
    pub site: String,
    pub grow_area: String,
    /// Samples used (at most the configured window).
    pub n: usize,
    pub geometric_mean: f64,
    pub p90: f64,
    /// Classification on the most recent sample, if recorded.
    pub current_class: Option<GrowingClass>,
    /// Whether the statistics meet the current classification's standard.
    /// `None` when the class is unknown or has no bacteriological standard.
    pub meets_current: Option<bool>,
    pub supported_class: Option<GrowingClass>,
}

/// Log-normal estimate of the 90th percentile. Needs at least two strictly
/// positive values.
pub fn estimated_p90(values: &[f64]) -> Result<f64, ReportError> {
    if values.len() < 2 {
        return Err(ReportError::GeometricMean {
            reason: format!("90th percentile needs at least 2 values, got {}", values.len()),
        });
    }
    if let Some(bad) = values.iter().find(|v| !(**v > 0.0)) {
        return Err(ReportError::GeometricMean {
            reason: format!("non-positive value {}", bad),
        });
    }
    let logs: Vec<f64> = values.iter().map(|v| v.log10()).collect();
    let n = logs.len() as f64;
    let mean = logs.iter().sum::<f64>() / n;
    let var = logs.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Ok(10f64.powf(mean + Z_90 * var.sqrt()))
}

/// Checks one site's recent values against its current classification.
pub fn check_site(
    site: &str,
    grow_area: &str,
    values: &[f64],
    current_class: Option<GrowingClass>,
) -> Result<SiteStandardsCheck, ReportError> {
    let gm = geometric_mean(values)?;
    let p90 = estimated_p90(values)?;

    let meets_current = current_class
        .and_then(find_standard)
        .and_then(|entry| entry.standard.as_ref())
        .map(|s| gm <= s.max_geometric_mean && p90 <= s.max_p90);

    Ok(SiteStandardsCheck {
        site: site.to_string(),
        grow_area: grow_area.to_string(),
        n: values.len(),
        geometric_mean: gm,
        p90,
        current_class,
        meets_current,
        supported_class: best_supported_class(gm, p90),
    })
}

/// Smallest usable window: the P90 estimate needs a standard deviation.
pub const MIN_WINDOW: usize = 2;

/// Runs `check_site` for every site with at least two non-missing values,
/// using each site's `window` most recent samples. A window below
/// `MIN_WINDOW` is raised to it. Sites are returned in site-code order.
pub fn check_all_sites(table: &SampleTable, window: usize) -> Result<Vec<SiteStandardsCheck>, ReportError> {
    let window = window.max(MIN_WINDOW);
    let mut by_site: BTreeMap<&str, Vec<&Sample>> = BTreeMap::new();
    for s in table.samples.iter().filter(|s| s.coli_val.is_some()) {
        by_site.entry(s.site.as_str()).or_default().push(s);
    }

    let mut checks = Vec::new();
    for (site, mut rows) in by_site {
        if rows.len() < 2 {
            continue;
        }
        rows.sort_by_key(|s| (s.sdate, s.sdatetime));
        let recent = &rows[rows.len().saturating_sub(window)..];
        let values: Vec<f64> = recent.iter().filter_map(|s| s.coli_val).collect();
        let latest = recent[recent.len() - 1];

        if let Some(bad) = recent.iter().find(|s| s.coli_val.is_some_and(|v| !(v > 0.0))) {
            return Err(ReportError::Domain {
                row: bad.line,
                column: COL_COLI.to_string(),
                value: bad.coli_val.map(|v| v.to_string()).unwrap_or_default(),
                reason: format!("standards check for site {} requires positive values", site),
            });
        }

        checks.push(check_site(site, &latest.grow_area, &values, latest.class)?);
    }
    Ok(checks)
}
