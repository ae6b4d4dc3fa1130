/// Structured logging for the shellfish report
///
/// Provides stage-tagged logging with an optional context (file, column,
/// growing area), timestamps, and severity levels. Supports console output
/// and an optional append-only log file.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loader,
    Normalizer,
    Reporter,
    Visualizer,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Loader => write!(f, "LOAD"),
            Stage::Normalizer => write!(f, "NORM"),
            Stage::Reporter => write!(f, "REPORT"),
            Stage::Visualizer => write!(f, "PLOT"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
    /// Stdout carries the report itself (JSON output), so every console
    /// line goes to stderr.
    stdout_reserved: bool,
}

/// A poisoned lock only means an earlier log call panicked mid-write; the
/// logger inside is still usable.
fn lock_logger() -> MutexGuard<'static, Option<Logger>> {
    LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Whether a console line at `level` is written to stderr.
fn console_to_stderr(level: LogLevel, stdout_reserved: bool) -> bool {
    stdout_reserved || matches!(level, LogLevel::Error | LogLevel::Warning)
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool, stdout_reserved: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
            stdout_reserved,
        };

        *lock_logger() = Some(logger);
    }

    fn log(&self, level: LogLevel, stage: Stage, context: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let context_part = context.map(|c| format!(" [{}]", c)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, stage, context_part, message
        );

        let console_line = if self.console_timestamps {
            log_entry.clone()
        } else {
            match level {
                LogLevel::Error => format!("   ✗ {}{}: {}", stage, context_part, message),
                LogLevel::Warning => format!("   ⚠ {}{}: {}", stage, context_part, message),
                LogLevel::Info => format!("   {}", message),
                LogLevel::Debug => format!("   [DEBUG] {}{}: {}", stage, context_part, message),
            }
        };

        if console_to_stderr(level, self.stdout_reserved) {
            eprintln!("{}", console_line);
        } else {
            println!("{}", console_line);
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger. With `stdout_reserved`, informational
/// lines go to stderr as well so stdout holds only the report.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
    stdout_reserved: bool,
) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps, stdout_reserved);
}

fn dispatch(level: LogLevel, stage: Stage, context: Option<&str>, message: &str) {
    // Logging before init_logger (library use, tests) is a no-op.
    if let Some(logger) = lock_logger().as_ref() {
        logger.log(level, stage, context, message);
    }
}

/// Log a general informational message
pub fn info(stage: Stage, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, stage, context, message);
}

/// Log a warning message
pub fn warn(stage: Stage, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, stage, context, message);
}

/// Log an error message
pub fn error(stage: Stage, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, stage, context, message);
}

/// Log a debug message
pub fn debug(stage: Stage, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, stage, context, message);
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Format the line logged when a stage aborts the run.
pub fn failure_message(operation: &str, kind: &str, err: &dyn std::error::Error) -> String {
    format!("{} failed [{}]: {}", operation, kind.to_uppercase(), err)
}

/// Log a fatal stage failure, tagged with the error's class.
pub fn log_stage_failure(stage: Stage, operation: &str, err: &crate::error::ReportError) {
    error(stage, None, &failure_message(operation, err.kind(), err));
}

// ---------------------------------------------------------------------------
// Stage Summary Logging
// ---------------------------------------------------------------------------

/// Log how many items a stage processed and how many needed attention.
pub fn log_stage_summary(stage: Stage, what: &str, total: usize, flagged: usize) {
    let message = format!("{}: {} processed, {} flagged", what, total, flagged);

    if flagged == 0 {
        info(stage, None, &message);
    } else {
        warn(stage, None, &message);
    }
}
