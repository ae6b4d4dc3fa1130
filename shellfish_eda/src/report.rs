//! Exploratory report assembly and console output.
//!
//! `build_report` runs every descriptive query over the normalized table and
//! collects the results into one serializable `EdaReport`. The report is
//! printed either as a human-readable summary or as pretty JSON.

use crate::analysis::censoring::{CensorCount, DistinctValue, censoring_summary, distinct_values};
use crate::analysis::correlation::{CorrelationMatrix, spearman_matrix};
use crate::analysis::geomean::{GroupMean, geometric_means_by_area_year};
use crate::analysis::groupings::{
    AreaCount, CategoryCount, class_counts, grow_area_counts, tide_counts, year_counts,
};
use crate::analysis::missing::{ColumnMissing, MissingSummary, missing_by_column, missing_coli};
use crate::analysis::screening::{FlaggedRow, low_value_rows, non_integer_rows};
use crate::analysis::thresholds::{SiteStandardsCheck, check_all_sites};
use crate::config::{AnalysisConfig, OutputFormat};
use crate::error::ReportError;
use crate::logging::{self, Stage};
use crate::model::{SampleTable, VocabularyIssue};
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EdaReport {
    pub generated_at: String,
    pub source: String,
    pub sample_count: usize,
    pub missing: MissingSummary,
    pub missing_by_column: Vec<ColumnMissing>,
    pub distinct_values: Vec<DistinctValue>,
    pub censoring: Vec<CensorCount>,
    pub low_value_threshold: f64,
    pub low_values: Vec<FlaggedRow>,
    pub non_integer_values: Vec<FlaggedRow>,
    pub area_year_means: Vec<GroupMean>,
    pub correlations: CorrelationMatrix,
    pub class_counts: Vec<CategoryCount>,
    pub tide_counts: Vec<CategoryCount>,
    pub year_counts: Vec<CategoryCount>,
    pub area_counts: Vec<AreaCount>,
    pub standards_window: usize,
    pub standards: Vec<SiteStandardsCheck>,
    pub vocabulary_issues: Vec<VocabularyIssue>,
}

pub fn build_report(table: &SampleTable, settings: &AnalysisConfig) -> Result<EdaReport, ReportError> {
    let missing = missing_coli(table);
    logging::log_stage_summary(Stage::Reporter, "ColiVal values", missing.total, missing.missing);

    let low_values = low_value_rows(table, settings.low_value_threshold);
    let non_integer_values = non_integer_rows(table);
    logging::info(
        Stage::Reporter,
        Some("screening"),
        &format!(
            "{} values <= {}, {} non-integer values",
            low_values.len(),
            settings.low_value_threshold,
            non_integer_values.len()
        ),
    );

    let area_year_means = geometric_means_by_area_year(table)?;
    let standards = check_all_sites(table, settings.standards_window)?;
    let failing = standards.iter().filter(|c| c.meets_current == Some(false)).count();
    logging::log_stage_summary(Stage::Reporter, "sites checked against standards", standards.len(), failing);

    Ok(EdaReport {
        generated_at: Utc::now().to_rfc3339(),
        source: table.source.clone(),
        sample_count: table.len(),
        missing,
        missing_by_column: missing_by_column(table),
        distinct_values: distinct_values(table),
        censoring: censoring_summary(table),
        low_value_threshold: settings.low_value_threshold,
        low_values,
        non_integer_values,
        area_year_means,
        correlations: spearman_matrix(table),
        class_counts: class_counts(table),
        tide_counts: tide_counts(table),
        year_counts: year_counts(table),
        area_counts: grow_area_counts(table),
        standards_window: settings.standards_window,
        standards,
        vocabulary_issues: table.vocabulary_issues.clone(),
    })
}

// ============================================================================
// Output
// ============================================================================

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// The report as text (summary) or pretty JSON.
pub fn render(report: &EdaReport, format: OutputFormat) -> Result<String, ReportError> {
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report).map_err(|e| ReportError::Render {
            chart: "json report".to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Write the rendered report to `out`, which holds nothing else.
pub fn write_report<W: io::Write>(out: &mut W, report: &EdaReport, format: OutputFormat) -> Result<(), ReportError> {
    let text = render(report, format)?;
    writeln!(out, "{}", text)
        .and_then(|_| out.flush())
        .map_err(|e| ReportError::Io {
            path: PathBuf::from("<stdout>"),
            source: e,
        })
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "\n{}\n{}\n{}", RULE, title, RULE)
}

fn opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}

fn write_counts(f: &mut fmt::Formatter<'_>, title: &str, counts: &[CategoryCount]) -> fmt::Result {
    writeln!(f, "{}:", title)?;
    for c in counts {
        writeln!(f, "  {:<12} {:>6}", c.label, c.count)?;
    }
    Ok(())
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[FlaggedRow]) -> fmt::Result {
    for r in rows {
        writeln!(
            f,
            "  line {:>6}  {:<12} {}  {:>10}  {}",
            r.line,
            r.site,
            r.sdate,
            r.value,
            r.censor.label()
        )?;
    }
    Ok(())
}

/// Human-readable summary of the whole report.
impl fmt::Display for EdaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, "SHELLFISH E. COLI EXPLORATORY REPORT")?;
        writeln!(f, "Source:   {}", self.source)?;
        writeln!(f, "Samples:  {}", self.sample_count)?;
        writeln!(f, "Created:  {}", self.generated_at)?;

        section(f, "Missing values")?;
        let m = &self.missing;
        writeln!(
            f,
            "ColiVal missing: {}/{} ({:.1}%), {} scheduled but not collected",
            m.missing,
            m.total,
            m.proportion * 100.0,
            m.scheduled_uncollected
        )?;
        for c in &self.missing_by_column {
            writeln!(f, "  {:<12} {:>6}", c.column, c.missing)?;
        }

        section(f, "Censoring")?;
        for c in &self.censoring {
            writeln!(
                f,
                "  {:<12} {:>6}  range {} .. {}",
                c.state.label(),
                c.count,
                opt(c.min_value, 1),
                opt(c.max_value, 1)
            )?;
        }
        writeln!(f, "Distinct values (* = censored):")?;
        let cells: Vec<String> = self
            .distinct_values
            .iter()
            .map(|d| format!("{}{}x{}", d.value, if d.censored { "*" } else { "" }, d.count))
            .collect();
        for chunk in cells.chunks(8) {
            writeln!(f, "  {}", chunk.join("  "))?;
        }

        section(f, "Screening")?;
        writeln!(f, "Values <= {}: {}", self.low_value_threshold, self.low_values.len())?;
        write_rows(f, &self.low_values)?;
        writeln!(f, "Non-integer values: {}", self.non_integer_values.len())?;
        write_rows(f, &self.non_integer_values)?;

        section(f, "Geometric mean by growing area and year")?;
        for g in &self.area_year_means {
            writeln!(f, "  {:<8} {}  n={:<5} gm={:.2}", g.grow_area, g.year, g.n, g.geometric_mean)?;
        }

        section(f, "Spearman correlation (pairwise complete)")?;
        let corr = &self.correlations;
        write!(f, "  {:<8}", "")?;
        for name in &corr.columns {
            write!(f, "{:>9}", name)?;
        }
        writeln!(f)?;
        for (name, row) in corr.columns.iter().zip(&corr.coefficients) {
            write!(f, "  {:<8}", name)?;
            for rho in row {
                write!(f, "{:>9}", opt(*rho, 3))?;
            }
            writeln!(f)?;
        }

        section(f, "Counts")?;
        write_counts(f, "Class", &self.class_counts)?;
        write_counts(f, "Tide", &self.tide_counts)?;
        write_counts(f, "Year", &self.year_counts)?;
        writeln!(f, "Growing areas:")?;
        for a in &self.area_counts {
            writeln!(f, "  {:<12} {:>4} sites {:>6} samples", a.grow_area, a.sites, a.samples)?;
        }

        section(
            f,
            &format!("Standards check (last {} samples per site)", self.standards_window),
        )?;
        for c in &self.standards {
            let status = match c.meets_current {
                Some(true) => "meets",
                Some(false) => "EXCEEDS",
                None => "n/a",
            };
            writeln!(
                f,
                "  {:<12} n={:<3} gm={:>8.2} p90={:>9.2}  class {:<2} {:<7} supports {}",
                c.site,
                c.n,
                c.geometric_mean,
                c.p90,
                c.current_class.map_or("-", |k| k.label()),
                status,
                c.supported_class.map_or("none", |k| k.label())
            )?;
        }

        if !self.vocabulary_issues.is_empty() {
            section(f, "Out-of-vocabulary values (treated as missing)")?;
            for v in &self.vocabulary_issues {
                writeln!(f, "  line {:>6}  {:<6} {:?}", v.row, v.column, v.value)?;
            }
        }

        write!(f, "{}", RULE)
    }
}

// ============================================================================
// Tests
// ============================================================================
