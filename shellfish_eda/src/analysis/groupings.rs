/// Sample counts by category, year and growing area.
///
/// Category tables list every vocabulary level in order, including levels
/// with no samples, followed by a row for missing values.

use crate::model::*;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

pub const MISSING_LABEL: &str = "(missing)";

fn with_missing(mut counts: Vec<CategoryCount>, missing: usize) -> Vec<CategoryCount> {
    counts.push(CategoryCount {
        label: MISSING_LABEL.to_string(),
        count: missing,
    });
    counts
}

pub fn class_counts(table: &SampleTable) -> Vec<CategoryCount> {
    let counts = GrowingClass::ALL
        .iter()
        .map(|&c| CategoryCount {
            label: c.label().to_string(),
            count: table.samples.iter().filter(|s| s.class == Some(c)).count(),
        })
        .collect();
    with_missing(counts, table.samples.iter().filter(|s| s.class.is_none()).count())
}

pub fn tide_counts(table: &SampleTable) -> Vec<CategoryCount> {
    let counts = TidePhase::ALL
        .iter()
        .map(|&t| CategoryCount {
            label: t.label().to_string(),
            count: table.samples.iter().filter(|s| s.tide == Some(t)).count(),
        })
        .collect();
    with_missing(counts, table.samples.iter().filter(|s| s.tide.is_none()).count())
}

/// Samples per year, ascending.
pub fn year_counts(table: &SampleTable) -> Vec<CategoryCount> {
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for s in &table.samples {
        *by_year.entry(s.year).or_default() += 1;
    }
    by_year
        .into_iter()
        .map(|(year, count)| CategoryCount {
            label: year.to_string(),
            count,
        })
        .collect()
}

/// Samples and distinct sites per growing area, ordered by area code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaCount {
    pub grow_area: String,
    pub sites: usize,
    pub samples: usize,
}

pub fn grow_area_counts(table: &SampleTable) -> Vec<AreaCount> {
    let mut by_area: BTreeMap<&str, (std::collections::BTreeSet<&str>, usize)> = BTreeMap::new();
    for s in &table.samples {
        let entry = by_area.entry(s.grow_area.as_str()).or_default();
        entry.0.insert(s.site.as_str());
        entry.1 += 1;
    }
    by_area
        .into_iter()
        .map(|(area, (sites, samples))| AreaCount {
            grow_area: area.to_string(),
            sites: sites.len(),
            samples,
        })
        .collect()
}
