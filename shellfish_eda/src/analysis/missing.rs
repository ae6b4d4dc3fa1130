//! Missing-value accounting.
//!
//! A sample row with complete site and date metadata but no `ColiVal` is a
//! scheduled sample that was not collected. It is counted, not treated as a
//! data error.

use crate::model::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingSummary {
    pub total: usize,
    pub missing: usize,
    /// `missing / total`, zero for an empty table.
    pub proportion: f64,
    /// Missing rows whose site and date metadata is complete.
    pub scheduled_uncollected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissing {
    pub column: &'static str,
    pub missing: usize,
}

fn has_site_metadata(s: &Sample) -> bool {
    !s.site.is_empty() && !s.grow_area.is_empty()
}

pub fn missing_coli(table: &SampleTable) -> MissingSummary {
    let total = table.len();
    let missing_rows: Vec<&Sample> = table
        .samples
        .iter()
        .filter(|s| s.coli_val.is_none())
        .collect();
    let missing = missing_rows.len();

    MissingSummary {
        total,
        missing,
        proportion: if total == 0 { 0.0 } else { missing as f64 / total as f64 },
        scheduled_uncollected: missing_rows.iter().filter(|s| has_site_metadata(s)).count(),
    }
}

/// Missing counts for each optional column, in file order.
pub fn missing_by_column(table: &SampleTable) -> Vec<ColumnMissing> {
    let count = |pred: fn(&Sample) -> bool| table.samples.iter().filter(|s| pred(s)).count();
    vec![
        ColumnMissing { column: COL_SDATETIME, missing: count(|s| s.sdatetime.is_none()) },
        ColumnMissing { column: COL_TIDE, missing: count(|s| s.tide.is_none()) },
        ColumnMissing { column: COL_COLI, missing: count(|s| s.coli_val.is_none()) },
        ColumnMissing { column: COL_CLASS, missing: count(|s| s.class.is_none()) },
        ColumnMissing { column: COL_TEMP, missing: count(|s| s.temp.is_none()) },
        ColumnMissing { column: COL_SAL, missing: count(|s| s.sal.is_none()) },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::*;

    #[test]
    fn test_two_uncollected_of_ten() {
        let summary = missing_coli(&ten_rows_two_missing());
        assert_eq!(summary.total, 10);
        assert_eq!(summary.missing, 2);
        assert_eq!(summary.scheduled_uncollected, 2);
        assert!((summary.proportion - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_empty_table_has_zero_proportion() {
        let summary = missing_coli(&table(Vec::new()));
        assert_eq!(summary.total, 0);
        assert_eq!(summary.proportion, 0.0);
    }

    #[test]
    fn test_missing_by_column_counts_each_field() {
        let mut t = ten_rows_two_missing();
        t.samples[0].temp = Some(12.0);
        let by_column = missing_by_column(&t);

        let lookup = |name: &str| by_column.iter().find(|c| c.column == name).map(|c| c.missing);
        assert_eq!(lookup("ColiVal"), Some(2));
        assert_eq!(lookup("Temp"), Some(9));
        assert_eq!(lookup("Tide"), Some(0));
    }
}
