//! Type normalization for loaded sample rows.
//!
//! Resolves `Class` and `Tide` into their ordered vocabularies, parses the
//! sample date (and optional date-time), and derives day-of-year and month.
//! `normalize` is a pure function of its input: the raw table is never
//! modified and normalizing an already-normalized table (through
//! `SampleTable::to_raw`) gives back the same table.

use crate::config::VocabularyPolicy;
use crate::error::ReportError;
use crate::logging::{self, Stage};
use crate::model::*;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Accepted `SDate` layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Accepted `SDateTime` layouts, tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

pub fn normalize(raw: &RawTable, policy: VocabularyPolicy) -> Result<SampleTable, ReportError> {
    let mut samples = Vec::with_capacity(raw.samples.len());
    let mut vocabulary_issues = Vec::new();

    for row in &raw.samples {
        let sdate = parse_date(&row.sdate, row.line)?;
        let sdatetime = match &row.sdatetime {
            Some(text) => Some(parse_datetime(text, row.line)?),
            None => None,
        };

        let class = resolve(
            row.class.as_deref(),
            GrowingClass::from_label,
            row.line,
            COL_CLASS,
            policy,
            &mut vocabulary_issues,
        )?;
        let tide = resolve(
            row.tide.as_deref(),
            TidePhase::from_label,
            row.line,
            COL_TIDE,
            policy,
            &mut vocabulary_issues,
        )?;

        samples.push(Sample {
            line: row.line,
            site: row.site.clone(),
            grow_area: row.grow_area.clone(),
            year: row.year.unwrap_or_else(|| sdate.year()),
            sdate,
            sdatetime,
            coli_val: row.coli_val,
            lc_flag: row.lc_flag,
            rc_flag: row.rc_flag,
            class,
            tide,
            temp: row.temp,
            sal: row.sal,
            doy: sdate.ordinal(),
            month: sdate.month(),
        });
    }

    for issue in &vocabulary_issues {
        logging::warn(
            Stage::Normalizer,
            Some(&issue.column),
            &format!("row {}: '{}' is outside the vocabulary, treated as missing", issue.row, issue.value),
        );
    }
    logging::log_stage_summary(Stage::Normalizer, "rows", samples.len(), vocabulary_issues.len());

    Ok(SampleTable {
        source: raw.source.clone(),
        samples,
        vocabulary_issues,
    })
}

/// Map an optional category label through `lookup`, applying `policy` to
/// labels outside the vocabulary.
fn resolve<T>(
    value: Option<&str>,
    lookup: fn(&str) -> Option<T>,
    row: u64,
    column: &str,
    policy: VocabularyPolicy,
    issues: &mut Vec<VocabularyIssue>,
) -> Result<Option<T>, ReportError> {
    let Some(text) = value else {
        return Ok(None);
    };
    if let Some(level) = lookup(text) {
        return Ok(Some(level));
    }
    match policy {
        VocabularyPolicy::Reject => Err(ReportError::Domain {
            row,
            column: column.to_string(),
            value: text.to_string(),
            reason: "value is outside the fixed vocabulary".to_string(),
        }),
        VocabularyPolicy::Flag => {
            issues.push(VocabularyIssue {
                row,
                column: column.to_string(),
                value: text.to_string(),
            });
            Ok(None)
        }
    }
}

fn parse_date(text: &str, row: u64) -> Result<NaiveDate, ReportError> {
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ReportError::Parse {
            row,
            column: COL_SDATE.to_string(),
            value: text.to_string(),
            reason: format!("expected a date as one of {:?}", DATE_FORMATS),
        })
}

fn parse_datetime(text: &str, row: u64) -> Result<NaiveDateTime, ReportError> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ReportError::Parse {
            row,
            column: COL_SDATETIME.to_string(),
            value: text.to_string(),
            reason: "unrecognized date-time layout".to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row(line: u64, sdate: &str, class: Option<&str>, tide: Option<&str>) -> RawSample {
        RawSample {
            line,
            site: "WH001.00".to_string(),
            grow_area: "WH".to_string(),
            year: None,
            sdate: sdate.to_string(),
            sdatetime: None,
            coli_val: Some(4.0),
            lc_flag: false,
            rc_flag: false,
            class: class.map(String::from),
            tide: tide.map(String::from),
            temp: Some(12.0),
            sal: Some(29.5),
        }
    }

    fn table(rows: Vec<RawSample>) -> RawTable {
        RawTable {
            source: "test".to_string(),
            samples: rows,
        }
    }

    #[test]
    fn test_derives_doy_month_and_year() {
        let raw = table(vec![raw_row(2, "2016-03-01", Some("A"), Some("LF"))]);
        let t = normalize(&raw, VocabularyPolicy::Reject).expect("valid row");
        let s = &t.samples[0];
        // 2016 is a leap year: 31 + 29 + 1
        assert_eq!(s.doy, 61);
        assert_eq!(s.month, 3);
        assert_eq!(s.year, 2016, "blank YEAR is filled from SDate");
        assert_eq!(s.class, Some(GrowingClass::Approved));
        assert_eq!(s.tide, Some(TidePhase::LowFlood));
    }

    #[test]
    fn test_doy_stays_in_range_at_year_boundaries() {
        let raw = table(vec![
            raw_row(2, "2015-01-01", None, None),
            raw_row(3, "2015-12-31", None, None),
            raw_row(4, "12/31/2016", None, None),
        ]);
        let t = normalize(&raw, VocabularyPolicy::Reject).expect("valid rows");
        let doys: Vec<u32> = t.samples.iter().map(|s| s.doy).collect();
        assert_eq!(doys, vec![1, 365, 366]);
        for s in &t.samples {
            assert_eq!(s.doy, s.sdate.ordinal());
            assert!((1..=366).contains(&s.doy));
        }
    }

    #[test]
    fn test_explicit_year_is_kept() {
        let mut row = raw_row(2, "2016-03-01", None, None);
        row.year = Some(2015);
        let t = normalize(&table(vec![row]), VocabularyPolicy::Reject).expect("valid row");
        assert_eq!(t.samples[0].year, 2015);
    }

    #[test]
    fn test_malformed_date_is_parse_error_with_row() {
        let raw = table(vec![raw_row(7, "2016-13-45", None, None)]);
        match normalize(&raw, VocabularyPolicy::Reject) {
            Err(ReportError::Parse { row, column, .. }) => {
                assert_eq!(row, 7);
                assert_eq!(column, "SDate");
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_datetime_layouts() {
        for text in [
            "2016-05-02 09:15:00",
            "2016-05-02 09:15",
            "2016-05-02T09:15:00",
            "2016-05-02T09:15:00Z",
            "05/02/2016 09:15",
        ] {
            let dt = parse_datetime(text, 2).unwrap_or_else(|e| panic!("'{}' should parse: {}", text, e));
            assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2016-05-02 09:15");
        }
        assert!(parse_datetime("yesterday morning", 2).is_err());
    }

    #[test]
    fn test_out_of_vocabulary_class_rejected_by_default() {
        let raw = table(vec![raw_row(5, "2016-05-02", Some("Q"), Some("H"))]);
        match normalize(&raw, VocabularyPolicy::Reject) {
            Err(ReportError::Domain { row, column, value, .. }) => {
                assert_eq!(row, 5);
                assert_eq!(column, "Class");
                assert_eq!(value, "Q");
            }
            other => panic!("expected Domain error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_vocabulary_tide_flagged_not_dropped_silently() {
        let raw = table(vec![
            raw_row(2, "2016-05-02", Some("A"), Some("Slack")),
            raw_row(3, "2016-05-03", Some("R"), Some("E")),
        ]);
        let t = normalize(&raw, VocabularyPolicy::Flag).expect("flag policy does not fail");
        assert_eq!(t.samples[0].tide, None);
        assert_eq!(t.samples[1].tide, Some(TidePhase::Ebb));
        assert_eq!(
            t.vocabulary_issues,
            vec![VocabularyIssue {
                row: 2,
                column: "Tide".to_string(),
                value: "Slack".to_string(),
            }]
        );
    }

    #[test]
    fn test_categories_only_take_vocabulary_values() {
        let raw = table(vec![
            raw_row(2, "2016-05-02", Some("ca"), Some("hf")),
            raw_row(3, "2016-05-03", Some("X"), Some("LE")),
            raw_row(4, "2016-05-04", Some("bogus"), Some("bogus")),
        ]);
        let t = normalize(&raw, VocabularyPolicy::Flag).expect("flag policy does not fail");
        for s in &t.samples {
            if let Some(c) = s.class {
                assert!(GrowingClass::ALL.contains(&c));
            }
            if let Some(tide) = s.tide {
                assert!(TidePhase::ALL.contains(&tide));
            }
        }
        assert_eq!(t.vocabulary_issues.len(), 2);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut with_time = raw_row(3, "06/14/2017", Some("cr"), Some("he"));
        with_time.sdatetime = Some("2017-06-14T07:45:00Z".to_string());
        with_time.lc_flag = true;
        let raw = table(vec![raw_row(2, "2016-05-02", Some("A"), None), with_time]);

        let once = normalize(&raw, VocabularyPolicy::Reject).expect("first pass");
        let twice = normalize(&once.to_raw(), VocabularyPolicy::Reject).expect("second pass");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_is_idempotent_with_flagged_values() {
        let raw = table(vec![
            raw_row(2, "2016-05-02", Some("Q"), Some("H")),
            raw_row(3, "2016-05-03", Some("A"), Some("Slack")),
        ]);

        let once = normalize(&raw, VocabularyPolicy::Flag).expect("first pass");
        assert_eq!(once.vocabulary_issues.len(), 2);
        let twice = normalize(&once.to_raw(), VocabularyPolicy::Flag).expect("second pass");
        assert_eq!(once, twice, "flagged values must survive a second pass");

        // Reading the written-back view strictly still surfaces the bad value.
        assert!(normalize(&once.to_raw(), VocabularyPolicy::Reject).is_err());
    }

    #[test]
    fn test_input_table_is_not_modified() {
        let raw = table(vec![raw_row(2, "2016-05-02", Some("a"), Some("l"))]);
        let before = raw.clone();
        let _ = normalize(&raw, VocabularyPolicy::Reject).expect("valid");
        assert_eq!(raw, before);
    }
}
