/// Descriptive queries over a normalized `SampleTable`.
///
/// Every function here is read-only: it borrows the table and returns plain
/// data for the report. Nothing is fitted or modelled; censored values enter
/// at their reported value.
///
/// Submodules:
/// - `missing` — missing `ColiVal` and per-column missing counts.
/// - `censoring` — distinct values with censoring, counts per censor state.
/// - `screening` — low and non-integer values for manual inspection.
/// - `geomean` — geometric means, overall and by growing area and year.
/// - `correlation` — Spearman rank correlation matrix.
/// - `groupings` — sample counts by category, year and growing area.
/// - `thresholds` — per-site comparison against classification standards.

pub mod censoring;
pub mod correlation;
pub mod geomean;
pub mod groupings;
pub mod missing;
pub mod screening;
pub mod thresholds;

#[cfg(test)]
pub(crate) mod fixtures;
