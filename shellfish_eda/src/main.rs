use shellfish_eda::config::{self, OutputFormat, ReportConfig};
use shellfish_eda::error::ReportError;
use shellfish_eda::ingest::loader;
use shellfish_eda::logging::{self, Stage};
use shellfish_eda::{normalize, plots, report};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = match config::load_config(Path::new(config::CONFIG_FILE)) {
        Ok(settings) => settings,
        Err(e) => {
            logging::init_logger(logging::LogLevel::Info, None, false, false);
            logging::log_stage_failure(Stage::System, "Loading configuration", &e);
            return ExitCode::FAILURE;
        }
    };

    // JSON output owns stdout; log lines go to stderr.
    logging::init_logger(
        settings.logging.level,
        settings.logging.file.as_deref(),
        settings.logging.timestamps,
        settings.output.format == OutputFormat::Json,
    );

    let stdout = io::stdout();
    match run(&settings, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err((stage, operation, e)) => {
            logging::log_stage_failure(stage, operation, &e);
            ExitCode::FAILURE
        }
    }
}

type StageFailure = (Stage, &'static str, ReportError);

fn run<W: Write>(settings: &ReportConfig, out: &mut W) -> Result<(), StageFailure> {
    let raw = loader::load_samples(&settings.input.path, &settings.input.na_markers)
        .map_err(|e| (Stage::Loader, "Loading samples", e))?;

    let table = normalize::normalize(&raw, settings.analysis.vocabulary_policy)
        .map_err(|e| (Stage::Normalizer, "Normalizing samples", e))?;

    let eda = report::build_report(&table, &settings.analysis)
        .map_err(|e| (Stage::Reporter, "Building report", e))?;
    report::write_report(out, &eda, settings.output.format)
        .map_err(|e| (Stage::Reporter, "Writing report", e))?;

    plots::render_all(&table, &settings.output.figure_dir)
        .map_err(|e| (Stage::Visualizer, "Rendering figures", e))?;

    logging::info(Stage::System, None, "Report complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_settings(format: OutputFormat, figures: &str) -> ReportConfig {
        let mut settings = ReportConfig::default();
        settings.input.path =
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shellfish_sample.csv");
        settings.output.format = format;
        settings.output.figure_dir =
            std::env::temp_dir().join(format!("{}_{}", figures, std::process::id()));
        settings
    }

    #[test]
    fn test_json_run_writes_a_single_document() {
        let settings = fixture_settings(OutputFormat::Json, "shellfish_eda_json_run");
        logging::init_logger(logging::LogLevel::Info, None, false, true);

        let mut out = Vec::new();
        if let Err((stage, operation, e)) = run(&settings, &mut out) {
            panic!("{} {} failed: {}", stage, operation, e);
        }

        let value: serde_json::Value =
            serde_json::from_slice(&out).expect("report output is exactly one JSON document");
        assert_eq!(value["sample_count"], 12);
        assert_eq!(value["missing"]["missing"], 1);

        let _ = std::fs::remove_dir_all(&settings.output.figure_dir);
    }

    #[test]
    fn test_missing_input_fails_in_loader_stage() {
        let mut settings = fixture_settings(OutputFormat::Text, "shellfish_eda_missing_run");
        settings.input.path = PathBuf::from("no/such/input.csv");

        let mut out = Vec::new();
        match run(&settings, &mut out) {
            Err((stage, _, ReportError::FileNotFound { .. })) => assert_eq!(stage, Stage::Loader),
            Err((_, _, other)) => panic!("expected FileNotFound, got {}", other),
            Ok(()) => panic!("expected a failure"),
        }
        assert!(out.is_empty());
    }
}
