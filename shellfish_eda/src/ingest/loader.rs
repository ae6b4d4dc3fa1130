/// Shellfish monitoring CSV loader
///
/// Reads the historical sampling file (one header row, one sample per line)
/// and types the numeric and flag columns. Category and date columns are
/// left as text for the normalizer.
///
/// Row numbers in errors are 1-based line numbers in the source file, so
/// the header is line 1 and the first sample is line 2.

use crate::error::ReportError;
use crate::logging::{self, Stage};
use crate::model::*;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

// ============================================================================
// CSV Row Structure
// ============================================================================

/// One CSV row, addressed by header name. Every field is read as text and
/// typed afterwards so errors can name the row and column.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "SITE")]
    site: String,
    #[serde(rename = "GROW_AREA")]
    grow_area: String,
    #[serde(rename = "YEAR")]
    year: String,
    #[serde(rename = "SDate")]
    sdate: String,
    #[serde(rename = "SDateTime")]
    sdatetime: String,
    #[serde(rename = "Tide")]
    tide: String,
    #[serde(rename = "ColiVal")]
    coli_val: String,
    #[serde(rename = "LCFlag")]
    lc_flag: String,
    #[serde(rename = "RCFlag")]
    rc_flag: String,
    #[serde(rename = "Class")]
    class: String,
    #[serde(rename = "Temp")]
    temp: String,
    #[serde(rename = "Sal")]
    sal: String,
}

// ============================================================================
// Public API
// ============================================================================

/// Load the monitoring file at `path`.
///
/// # Errors
/// - `FileNotFound` if the path does not exist
/// - `Io` if it cannot be opened
/// - `MissingColumns`, `Csv` or `Parse` if the content does not match the
///   expected schema
pub fn load_samples(path: &Path, na_markers: &[String]) -> Result<RawTable, ReportError> {
    if !path.exists() {
        return Err(ReportError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let table = load_from_reader(file, &path.display().to_string(), na_markers)?;

    logging::info(
        Stage::Loader,
        Some(&table.source),
        &format!("Loaded {} sample rows", table.samples.len()),
    );

    Ok(table)
}

/// Load monitoring rows from any reader. `source` names the input in the
/// returned table and in error messages.
pub fn load_from_reader<R: Read>(
    reader: R,
    source: &str,
    na_markers: &[String],
) -> Result<RawTable, ReportError> {
    let csv_err = |e: csv::Error| ReportError::Csv {
        path: source.into(),
        source: e,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = clean_headers(reader.headers().map_err(csv_err)?);
    check_required_columns(&headers, source)?;

    let mut samples = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let row: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|e| ReportError::Parse {
                row: line,
                column: "<row>".to_string(),
                value: record.iter().collect::<Vec<_>>().join(","),
                reason: e.to_string(),
            })?;

        samples.push(type_row(row, line, na_markers)?);
    }

    Ok(RawTable {
        source: source.to_string(),
        samples,
    })
}

// ============================================================================
// Header Handling
// ============================================================================

/// Strip a UTF-8 byte-order mark and surrounding whitespace from header names.
fn clean_headers(raw: &StringRecord) -> StringRecord {
    raw.iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect()
}

fn check_required_columns(headers: &StringRecord, source: &str) -> Result<(), ReportError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReportError::MissingColumns {
            path: source.into(),
            missing,
        })
    }
}

// ============================================================================
// Field Typing
// ============================================================================

fn type_row(row: CsvRow, line: u64, na: &[String]) -> Result<RawSample, ReportError> {
    Ok(RawSample {
        line,
        site: required_text(&row.site, line, COL_SITE, na)?,
        grow_area: required_text(&row.grow_area, line, COL_GROW_AREA, na)?,
        year: parse_optional(&row.year, line, COL_YEAR, na)?,
        sdate: row.sdate,
        sdatetime: optional_text(&row.sdatetime, na),
        coli_val: parse_optional_finite(&row.coli_val, line, COL_COLI, na)?,
        lc_flag: parse_flag(&row.lc_flag, line, COL_LCFLAG, na)?,
        rc_flag: parse_flag(&row.rc_flag, line, COL_RCFLAG, na)?,
        class: optional_text(&row.class, na),
        tide: optional_text(&row.tide, na),
        temp: parse_optional_finite(&row.temp, line, COL_TEMP, na)?,
        sal: parse_optional_finite(&row.sal, line, COL_SAL, na)?,
    })
}

fn is_missing(value: &str, na: &[String]) -> bool {
    let v = value.trim();
    v.is_empty() || na.iter().any(|m| m == v)
}

fn optional_text(value: &str, na: &[String]) -> Option<String> {
    if is_missing(value, na) {
        None
    } else {
        Some(value.trim().to_string())
    }
}

fn required_text(value: &str, line: u64, column: &str, na: &[String]) -> Result<String, ReportError> {
    optional_text(value, na).ok_or_else(|| ReportError::Parse {
        row: line,
        column: column.to_string(),
        value: value.to_string(),
        reason: "required value is missing".to_string(),
    })
}

fn parse_optional<T>(value: &str, line: u64, column: &str, na: &[String]) -> Result<Option<T>, ReportError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if is_missing(value, na) {
        return Ok(None);
    }
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ReportError::Parse {
            row: line,
            column: column.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_optional_finite(value: &str, line: u64, column: &str, na: &[String]) -> Result<Option<f64>, ReportError> {
    match parse_optional::<f64>(value, line, column, na)? {
        Some(v) if !v.is_finite() => Err(ReportError::Parse {
            row: line,
            column: column.to_string(),
            value: value.to_string(),
            reason: "value is not a finite number".to_string(),
        }),
        other => Ok(other),
    }
}

/// Censoring flags arrive coded several ways (TRUE/FALSE, T/F, 1/0,
/// yes/no). A blank flag means the value is not censored.
fn parse_flag(value: &str, line: u64, column: &str, na: &[String]) -> Result<bool, ReportError> {
    if is_missing(value, na) {
        return Ok(false);
    }
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err(ReportError::Parse {
            row: line,
            column: column.to_string(),
            value: value.to_string(),
            reason: "expected a boolean flag".to_string(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "SITE,GROW_AREA,YEAR,SDate,SDateTime,Tide,ColiVal,LCFlag,RCFlag,Class,Temp,Sal";

    fn na() -> Vec<String> {
        vec![String::new(), "NA".to_string()]
    }

    fn load(body: &str) -> Result<RawTable, ReportError> {
        let text = format!("{}\n{}", HEADER, body);
        load_from_reader(text.as_bytes(), "inline", &na())
    }

    #[test]
    fn test_loads_typed_row() {
        let table = load("WH001.00,WH,2016,2016-05-02,2016-05-02 09:15:00,HE,2,TRUE,FALSE,A,11.5,30.2\n")
            .expect("well-formed row should load");
        assert_eq!(table.samples.len(), 1);

        let s = &table.samples[0];
        assert_eq!(s.line, 2, "first data row is line 2");
        assert_eq!(s.site, "WH001.00");
        assert_eq!(s.year, Some(2016));
        assert_eq!(s.coli_val, Some(2.0));
        assert!(s.lc_flag);
        assert!(!s.rc_flag);
        assert_eq!(s.class.as_deref(), Some("A"));
        assert_eq!(s.tide.as_deref(), Some("HE"));
        assert_eq!(s.temp, Some(11.5));
    }

    #[test]
    fn test_na_and_blank_cells_become_none() {
        let table = load("WH001.00,WH,2016,2016-05-02,,NA,NA,,,NA,,NA\n").expect("should load");
        let s = &table.samples[0];
        assert_eq!(s.coli_val, None);
        assert_eq!(s.sdatetime, None);
        assert_eq!(s.tide, None);
        assert_eq!(s.class, None);
        assert!(!s.lc_flag && !s.rc_flag, "blank flags mean not censored");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let text = format!(
            "{},Comment\nWH001.00,WH,2016,2016-05-02,,H,4,F,F,A,10,30,looks fine\n",
            HEADER
        );
        let table = load_from_reader(text.as_bytes(), "inline", &na()).expect("should load");
        assert_eq!(table.samples.len(), 1);
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let text = "SITE,GROW_AREA,SDate\nWH001.00,WH,2016-05-02\n";
        let err = load_from_reader(text.as_bytes(), "inline", &na()).unwrap_err();
        match err {
            ReportError::MissingColumns { missing, .. } => {
                assert!(missing.contains(&"ColiVal".to_string()));
                assert!(missing.contains(&"Tide".to_string()));
                assert!(!missing.contains(&"SITE".to_string()));
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_number_reports_row_and_column() {
        let err = load(
            "WH001.00,WH,2016,2016-05-02,,H,4,F,F,A,10,30\n\
             WH002.00,WH,2016,2016-05-02,,H,lots,F,F,A,10,30\n",
        )
        .unwrap_err();
        match err {
            ReportError::Parse { row, column, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(column, "ColiVal");
                assert_eq!(value, "lots");
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_flag_is_parse_error() {
        let err = load("WH001.00,WH,2016,2016-05-02,,H,4,maybe,F,A,10,30\n").unwrap_err();
        assert!(matches!(err, ReportError::Parse { ref column, .. } if column == "LCFlag"));
    }

    #[test]
    fn test_flag_codings_are_accepted() {
        for (raw, expected) in [("TRUE", true), ("t", true), ("1", true), ("No", false), ("0", false)] {
            assert_eq!(parse_flag(raw, 2, "LCFlag", &na()).unwrap(), expected, "flag '{}'", raw);
        }
    }

    #[test]
    fn test_missing_site_is_parse_error() {
        let err = load(",WH,2016,2016-05-02,,H,4,F,F,A,10,30\n").unwrap_err();
        assert!(matches!(err, ReportError::Parse { ref column, .. } if column == "SITE"));
    }

    #[test]
    fn test_infinite_value_is_rejected() {
        let err = load("WH001.00,WH,2016,2016-05-02,,H,inf,F,F,A,10,30\n").unwrap_err();
        assert!(matches!(err, ReportError::Parse { ref column, .. } if column == "ColiVal"));
    }

    #[test]
    fn test_missing_file_is_file_not_found() {
        let err = load_samples(Path::new("no/such/dir/Shellfish data 2015 2018.csv"), &na()).unwrap_err();
        assert!(matches!(err, ReportError::FileNotFound { .. }));
    }

    #[test]
    fn test_byte_order_mark_is_stripped_from_header() {
        let text = format!("\u{feff}{}\nWH001.00,WH,2016,2016-05-02,,H,4,F,F,A,10,30\n", HEADER);
        let table = load_from_reader(text.as_bytes(), "inline", &na()).expect("BOM should be tolerated");
        assert_eq!(table.samples[0].site, "WH001.00");
    }
}
