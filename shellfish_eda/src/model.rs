/// Core data types for the shellfish sanitation report.
///
/// This module defines the shared domain model imported by all other modules:
/// the raw rows produced by the loader, the normalized rows produced by the
/// normalizer, and the ordered vocabularies for growing-area classification
/// and tide phase. It contains no I/O.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const COL_SITE: &str = "SITE";
pub const COL_GROW_AREA: &str = "GROW_AREA";
pub const COL_YEAR: &str = "YEAR";
pub const COL_SDATE: &str = "SDate";
pub const COL_SDATETIME: &str = "SDateTime";
pub const COL_COLI: &str = "ColiVal";
pub const COL_LCFLAG: &str = "LCFlag";
pub const COL_RCFLAG: &str = "RCFlag";
pub const COL_CLASS: &str = "Class";
pub const COL_TIDE: &str = "Tide";
pub const COL_TEMP: &str = "Temp";
pub const COL_SAL: &str = "Sal";

/// Columns the input file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_SITE,
    COL_GROW_AREA,
    COL_YEAR,
    COL_SDATE,
    COL_SDATETIME,
    COL_TIDE,
    COL_COLI,
    COL_LCFLAG,
    COL_RCFLAG,
    COL_CLASS,
    COL_TEMP,
    COL_SAL,
];

// ---------------------------------------------------------------------------
// Ordered vocabularies
// ---------------------------------------------------------------------------

/// Regulatory growing-area classification, in the order used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GrowingClass {
    #[serde(rename = "A")]
    Approved,
    #[serde(rename = "CA")]
    ConditionallyApproved,
    #[serde(rename = "CR")]
    ConditionallyRestricted,
    #[serde(rename = "R")]
    Restricted,
    #[serde(rename = "P")]
    Prohibited,
    #[serde(rename = "X")]
    Unclassified,
}

impl GrowingClass {
    pub const ALL: [GrowingClass; 6] = [
        GrowingClass::Approved,
        GrowingClass::ConditionallyApproved,
        GrowingClass::ConditionallyRestricted,
        GrowingClass::Restricted,
        GrowingClass::Prohibited,
        GrowingClass::Unclassified,
    ];

    /// Code as it appears in the `Class` column.
    pub fn label(self) -> &'static str {
        match self {
            GrowingClass::Approved => "A",
            GrowingClass::ConditionallyApproved => "CA",
            GrowingClass::ConditionallyRestricted => "CR",
            GrowingClass::Restricted => "R",
            GrowingClass::Prohibited => "P",
            GrowingClass::Unclassified => "X",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GrowingClass::Approved => "Approved",
            GrowingClass::ConditionallyApproved => "Conditionally Approved",
            GrowingClass::ConditionallyRestricted => "Conditionally Restricted",
            GrowingClass::Restricted => "Restricted",
            GrowingClass::Prohibited => "Prohibited",
            GrowingClass::Unclassified => "Unclassified",
        }
    }

    /// Case-insensitive lookup of a `Class` code. Returns `None` for values
    /// outside the vocabulary.
    pub fn from_label(raw: &str) -> Option<Self> {
        let code = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for GrowingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Tide phase at sampling time, ordered around the tidal cycle starting at
/// low water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TidePhase {
    #[serde(rename = "L")]
    Low,
    #[serde(rename = "LF")]
    LowFlood,
    #[serde(rename = "F")]
    Flood,
    #[serde(rename = "HF")]
    HighFlood,
    #[serde(rename = "H")]
    High,
    #[serde(rename = "HE")]
    HighEbb,
    #[serde(rename = "E")]
    Ebb,
    #[serde(rename = "LE")]
    LowEbb,
}

impl TidePhase {
    pub const ALL: [TidePhase; 8] = [
        TidePhase::Low,
        TidePhase::LowFlood,
        TidePhase::Flood,
        TidePhase::HighFlood,
        TidePhase::High,
        TidePhase::HighEbb,
        TidePhase::Ebb,
        TidePhase::LowEbb,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TidePhase::Low => "L",
            TidePhase::LowFlood => "LF",
            TidePhase::Flood => "F",
            TidePhase::HighFlood => "HF",
            TidePhase::High => "H",
            TidePhase::HighEbb => "HE",
            TidePhase::Ebb => "E",
            TidePhase::LowEbb => "LE",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let code = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for TidePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Censoring status of a `ColiVal` measurement, from the two flag columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CensorState {
    Uncensored,
    /// True value is below the reported value (under the detection limit).
    Left,
    /// True value is above the reported value (over the counting limit).
    Right,
    /// Both flags set. Not physically meaningful; reported as a coding issue.
    Both,
}

impl CensorState {
    pub const ALL: [CensorState; 4] = [
        CensorState::Uncensored,
        CensorState::Left,
        CensorState::Right,
        CensorState::Both,
    ];

    pub fn from_flags(lc_flag: bool, rc_flag: bool) -> Self {
        match (lc_flag, rc_flag) {
            (false, false) => CensorState::Uncensored,
            (true, false) => CensorState::Left,
            (false, true) => CensorState::Right,
            (true, true) => CensorState::Both,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CensorState::Uncensored => "uncensored",
            CensorState::Left => "left-censored",
            CensorState::Right => "right-censored",
            CensorState::Both => "both flags set",
        }
    }
}

// ---------------------------------------------------------------------------
// Raw rows (loader output)
// ---------------------------------------------------------------------------

/// One row as typed by the loader. Numeric and flag columns are parsed;
/// categories and dates are still text and are resolved by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// 1-based line number in the source file, for diagnostics.
    pub line: u64,
    pub site: String,
    pub grow_area: String,
    pub year: Option<i32>,
    pub sdate: String,
    pub sdatetime: Option<String>,
    pub coli_val: Option<f64>,
    pub lc_flag: bool,
    pub rc_flag: bool,
    pub class: Option<String>,
    pub tide: Option<String>,
    pub temp: Option<f64>,
    pub sal: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Where the rows came from (file path or a test label).
    pub source: String,
    pub samples: Vec<RawSample>,
}

// ---------------------------------------------------------------------------
// Normalized rows (normalizer output)
// ---------------------------------------------------------------------------

/// A normalized water-quality sample with derived calendar fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub line: u64,
    pub site: String,
    pub grow_area: String,
    pub year: i32,
    pub sdate: NaiveDate,
    pub sdatetime: Option<NaiveDateTime>,
    pub coli_val: Option<f64>,
    pub lc_flag: bool,
    pub rc_flag: bool,
    pub class: Option<GrowingClass>,
    pub tide: Option<TidePhase>,
    pub temp: Option<f64>,
    pub sal: Option<f64>,
    /// Ordinal day of `sdate`, 1..=366.
    pub doy: u32,
    /// Calendar month of `sdate`, 1..=12.
    pub month: u32,
}

impl Sample {
    pub fn censor_state(&self) -> CensorState {
        CensorState::from_flags(self.lc_flag, self.rc_flag)
    }

    pub fn is_censored(&self) -> bool {
        self.lc_flag || self.rc_flag
    }

    /// Sample date as a fractional year, used as the time axis in figures.
    pub fn decimal_year(&self) -> f64 {
        let days_in_year = if self.sdate.leap_year() { 366.0 } else { 365.0 };
        self.sdate.year() as f64 + (self.doy as f64 - 1.0) / days_in_year
    }
}

/// Numeric (or numerically encoded temporal) columns available to the
/// correlation matrix and the pairwise figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericColumn {
    Coli,
    Temp,
    Sal,
    Doy,
    Year,
}

impl NumericColumn {
    pub fn label(self) -> &'static str {
        match self {
            NumericColumn::Coli => COL_COLI,
            NumericColumn::Temp => COL_TEMP,
            NumericColumn::Sal => COL_SAL,
            NumericColumn::Doy => "DOY",
            NumericColumn::Year => COL_YEAR,
        }
    }

    pub fn value(self, sample: &Sample) -> Option<f64> {
        match self {
            NumericColumn::Coli => sample.coli_val,
            NumericColumn::Temp => sample.temp,
            NumericColumn::Sal => sample.sal,
            NumericColumn::Doy => Some(sample.doy as f64),
            NumericColumn::Year => Some(sample.year as f64),
        }
    }
}

/// A raw category value that fell outside its vocabulary and was recorded
/// instead of rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyIssue {
    pub row: u64,
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    pub source: String,
    pub samples: Vec<Sample>,
    pub vocabulary_issues: Vec<VocabularyIssue>,
}

pub const SDATE_FORMAT: &str = "%Y-%m-%d";
pub const SDATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl SampleTable {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Non-missing `ColiVal` values in row order.
    pub fn coli_values(&self) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.coli_val).collect()
    }

    /// Raw text recorded for an out-of-vocabulary value in `column` on `line`.
    fn flagged_value(&self, line: u64, column: &str) -> Option<String> {
        self.vocabulary_issues
            .iter()
            .find(|issue| issue.row == line && issue.column == column)
            .map(|issue| issue.value.clone())
    }

    /// Raw view of the normalized rows, in the canonical text formats the
    /// normalizer accepts. Normalizing this view reproduces the table.
    /// Flagged out-of-vocabulary values are written back as they were read,
    /// so they are flagged again.
    pub fn to_raw(&self) -> RawTable {
        let samples = self
            .samples
            .iter()
            .map(|s| RawSample {
                line: s.line,
                site: s.site.clone(),
                grow_area: s.grow_area.clone(),
                year: Some(s.year),
                sdate: s.sdate.format(SDATE_FORMAT).to_string(),
                sdatetime: s
                    .sdatetime
                    .map(|dt| dt.format(SDATETIME_FORMAT).to_string()),
                coli_val: s.coli_val,
                lc_flag: s.lc_flag,
                rc_flag: s.rc_flag,
                class: s
                    .class
                    .map(|c| c.label().to_string())
                    .or_else(|| self.flagged_value(s.line, COL_CLASS)),
                tide: s
                    .tide
                    .map(|t| t.label().to_string())
                    .or_else(|| self.flagged_value(s.line, COL_TIDE)),
                temp: s.temp,
                sal: s.sal,
            })
            .collect();

        RawTable {
            source: self.source.clone(),
            samples,
        }
    }
}

// ---------------------------------------------------------------------------
// Standards
// ---------------------------------------------------------------------------

/// Bacteriological limits a site's recent samples must meet for a
/// classification, in MPN per 100 ml.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationStandard {
    pub max_geometric_mean: f64,
    pub max_p90: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growing_class_order_matches_regulatory_order() {
        let labels: Vec<_> = GrowingClass::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, ["A", "CA", "CR", "R", "P", "X"]);
        assert!(GrowingClass::Approved < GrowingClass::Prohibited);
        assert!(GrowingClass::ConditionallyRestricted < GrowingClass::Restricted);
    }

    #[test]
    fn test_tide_phase_has_eight_ordered_labels() {
        let labels: Vec<_> = TidePhase::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(labels, ["L", "LF", "F", "HF", "H", "HE", "E", "LE"]);
        let mut sorted = TidePhase::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, TidePhase::ALL.to_vec(), "ALL must be in Ord order");
    }

    #[test]
    fn test_from_label_is_case_insensitive_and_trims() {
        assert_eq!(GrowingClass::from_label(" ca "), Some(GrowingClass::ConditionallyApproved));
        assert_eq!(TidePhase::from_label("hf"), Some(TidePhase::HighFlood));
    }

    #[test]
    fn test_from_label_rejects_values_outside_vocabulary() {
        assert_eq!(GrowingClass::from_label("Q"), None);
        assert_eq!(GrowingClass::from_label(""), None);
        assert_eq!(TidePhase::from_label("HL"), None);
    }

    #[test]
    fn test_censor_state_from_flags() {
        assert_eq!(CensorState::from_flags(false, false), CensorState::Uncensored);
        assert_eq!(CensorState::from_flags(true, false), CensorState::Left);
        assert_eq!(CensorState::from_flags(false, true), CensorState::Right);
        assert_eq!(CensorState::from_flags(true, true), CensorState::Both);
    }

    #[test]
    fn test_decimal_year_starts_at_january_first() {
        let date = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let sample = Sample {
            line: 2,
            site: "WH001.00".to_string(),
            grow_area: "WH".to_string(),
            year: 2016,
            sdate: date,
            sdatetime: None,
            coli_val: Some(2.0),
            lc_flag: true,
            rc_flag: false,
            class: Some(GrowingClass::Approved),
            tide: None,
            temp: None,
            sal: None,
            doy: 1,
            month: 1,
        };
        assert_eq!(sample.decimal_year(), 2016.0);
        assert!(sample.is_censored());
        assert_eq!(sample.censor_state(), CensorState::Left);
    }
}
