//! Builders for synthetic sample tables used by unit tests.

use crate::model::*;
use chrono::{Datelike, NaiveDate};

pub fn sample(line: u64, site: &str, grow_area: &str, date: &str, coli_val: Option<f64>) -> Sample {
    let sdate = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("fixture dates are ISO");
    Sample {
        line,
        site: site.to_string(),
        grow_area: grow_area.to_string(),
        year: sdate.year(),
        sdate,
        sdatetime: None,
        coli_val,
        lc_flag: false,
        rc_flag: false,
        class: Some(GrowingClass::Approved),
        tide: Some(TidePhase::High),
        temp: None,
        sal: None,
        doy: sdate.ordinal(),
        month: sdate.month(),
    }
}

pub fn censored(mut s: Sample, lc_flag: bool, rc_flag: bool) -> Sample {
    s.lc_flag = lc_flag;
    s.rc_flag = rc_flag;
    s
}

pub fn table(samples: Vec<Sample>) -> SampleTable {
    SampleTable {
        source: "fixture".to_string(),
        samples,
        vocabulary_issues: Vec::new(),
    }
}

/// Ten samples from one site, two of them scheduled but not collected.
pub fn ten_rows_two_missing() -> SampleTable {
    let values = [
        Some(2.0),
        Some(4.0),
        None,
        Some(13.0),
        Some(2.0),
        Some(49.0),
        None,
        Some(8.0),
        Some(1.9),
        Some(120.0),
    ];
    let samples = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let date = format!("2016-{:02}-15", i + 1);
            sample(i as u64 + 2, "WH001.00", "WH", &date, *v)
        })
        .collect();
    table(samples)
}
