//! Report configuration.
//!
//! Settings live in an optional `shellfish_eda.toml` in the working
//! directory. Every field has a default, so a missing file (or a missing
//! section) runs the report against the standard input location.

use crate::error::ReportError;
use crate::logging::LogLevel;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "shellfish_eda.toml";

/// Input location, relative to the execution directory: the data lives in a
/// sibling `Derived_Data` folder.
pub const DEFAULT_DATA_PATH: &str = "../Derived_Data/Shellfish data 2015 2018.csv";

/// Values at or below this count are listed for manual inspection.
pub const DEFAULT_LOW_VALUE_THRESHOLD: f64 = 10.0;

/// Number of most recent samples per site used for the standards comparison.
pub const DEFAULT_STANDARDS_WINDOW: usize = 30;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub path: PathBuf,
    /// Cell contents treated as "no value" in optional columns.
    pub na_markers: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
            na_markers: vec![String::new(), "NA".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub figure_dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            figure_dir: PathBuf::from("figures"),
            format: OutputFormat::Text,
        }
    }
}

/// What the normalizer does with a `Class` or `Tide` value outside its
/// vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyPolicy {
    /// Fail the run with a domain error naming the row and value.
    Reject,
    /// Treat the value as missing and list it in the report.
    Flag,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub low_value_threshold: f64,
    pub vocabulary_policy: VocabularyPolicy,
    pub standards_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            low_value_threshold: DEFAULT_LOW_VALUE_THRESHOLD,
            vocabulary_policy: VocabularyPolicy::Reject,
            standards_window: DEFAULT_STANDARDS_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse configuration from TOML text. `origin` is only used in errors.
pub fn parse_config(text: &str, origin: &Path) -> Result<ReportConfig, ReportError> {
    let config: ReportConfig = toml::from_str(text).map_err(|e| ReportError::Config {
        path: origin.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate(&config, origin)?;
    Ok(config)
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<ReportConfig, ReportError> {
    if !path.exists() {
        return Ok(ReportConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&text, path)
}

fn validate(config: &ReportConfig, origin: &Path) -> Result<(), ReportError> {
    let threshold = config.analysis.low_value_threshold;
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ReportError::Config {
            path: origin.to_path_buf(),
            reason: format!("low_value_threshold must be positive, got {}", threshold),
        });
    }
    if config.analysis.standards_window < 2 {
        return Err(ReportError::Config {
            path: origin.to_path_buf(),
            reason: "standards_window must be at least 2 samples".to_string(),
        });
    }
    Ok(())
}
