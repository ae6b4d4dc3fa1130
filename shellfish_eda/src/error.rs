//! Error type shared by every stage of the report.
//!
//! Every failure is fatal for the run. Variants carry enough context
//! (file, row, column, offending value) for the diagnostic printed by `main`
//! to point at the problem without re-reading the data.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Input file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column(s) in {path}: {missing:?}")]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("Parse error at row {row}, column '{column}', value '{value}': {reason}")]
    Parse {
        row: u64,
        column: String,
        value: String,
        reason: String,
    },

    /// A value is well-formed but outside the set the analysis accepts
    /// (category vocabulary, non-positive count in a geometric mean).
    #[error("Domain error at row {row}, column '{column}', value '{value}': {reason}")]
    Domain {
        row: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Geometric mean undefined: {reason}")]
    GeometricMean { reason: String },

    #[error("Configuration error in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("Failed to render chart '{chart}': {reason}")]
    Render { chart: String, reason: String },
}

impl ReportError {
    /// Short tag naming the failure class, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::FileNotFound { .. } | ReportError::Io { .. } => "io",
            ReportError::Csv { .. }
            | ReportError::MissingColumns { .. }
            | ReportError::Parse { .. } => "parse",
            ReportError::Domain { .. } | ReportError::GeometricMean { .. } => "domain",
            ReportError::Config { .. } => "config",
            ReportError::Render { .. } => "render",
        }
    }
}
