use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use visit_core::constants::{ALLOW_OVERLAPPING_VISITS_ENV, VOID_REASON_MAX_LENGTH_ENV};
use visit_core::{FieldErrors, InMemoryVisitRepository, ValidationConfig, Visit, VisitValidator};

#[derive(Parser)]
#[command(name = "visits")]
#[command(about = "Check patient visits against their visit history")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a visit against a visit history
    Validate {
        /// YAML file with persisted visits, encounters and attribute types
        #[arg(long)]
        history: PathBuf,
        /// YAML file with the visit to check
        #[arg(long)]
        visit: PathBuf,
        /// Allow the visit to overlap other visits of the same patient
        #[arg(long)]
        allow_overlapping: bool,
        /// Maximum voidReason length, in characters
        #[arg(long)]
        void_reason_max_length: Option<usize>,
    },
    /// Print the configuration resolved from the environment
    CheckConfig,
}

#[derive(Serialize)]
struct ValidationReport<'a> {
    valid: bool,
    checked_at: DateTime<Utc>,
    errors: &'a FieldErrors,
}

/// Entry point for the `visits` CLI.
///
/// # Environment Variables
/// - `VISIT_ALLOW_OVERLAPPING_VISITS`: accept visits that overlap (default: false)
/// - `VISIT_VOID_REASON_MAX_LENGTH`: maximum voidReason length (default: 255)
/// - `RUST_LOG`: log filter; logs go to stderr so stdout stays machine-readable
fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("visit_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = resolve_config().context("invalid validation configuration")?;

    match cli.command {
        Commands::Validate {
            history,
            visit,
            allow_overlapping,
            void_reason_max_length,
        } => {
            let cfg = apply_overrides(cfg, allow_overlapping, void_reason_max_length)?;
            let errors = validate_files(&history, &visit, cfg)?;

            let report = ValidationReport {
                valid: !errors.has_errors(),
                checked_at: Utc::now(),
                errors: &errors,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);

            if errors.has_errors() {
                tracing::info!("visit rejected with {} error(s)", errors.error_count());
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::CheckConfig => {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolve_config() -> visit_core::VisitResult<ValidationConfig> {
    ValidationConfig::from_env_values(
        std::env::var(ALLOW_OVERLAPPING_VISITS_ENV).ok(),
        std::env::var(VOID_REASON_MAX_LENGTH_ENV).ok(),
    )
}

/// Command-line flags win over the environment.
fn apply_overrides(
    cfg: ValidationConfig,
    allow_overlapping: bool,
    void_reason_max_length: Option<usize>,
) -> anyhow::Result<ValidationConfig> {
    let cfg = if allow_overlapping {
        cfg.with_allow_overlapping_visits(true)
    } else {
        cfg
    };

    match void_reason_max_length {
        Some(max_length) => ValidationConfig::new(cfg.allow_overlapping_visits(), max_length)
            .context("invalid --void-reason-max-length"),
        None => Ok(cfg),
    }
}

fn validate_files(
    history: &Path,
    visit: &Path,
    cfg: ValidationConfig,
) -> anyhow::Result<FieldErrors> {
    let repository = InMemoryVisitRepository::load(history)
        .with_context(|| format!("failed to load visit history {}", history.display()))?;
    let visit = Visit::load(visit)
        .with_context(|| format!("failed to load visit {}", visit.display()))?;

    let validator = VisitValidator::new(Arc::new(cfg), repository);
    let errors = validator
        .validate_visit(&visit)
        .context("visit could not be validated")?;
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use visit_core::Field;

    const HISTORY: &str = r#"
visits:
  - id: 1f0c9e4e-54a4-4a8f-9a67-0e6a3f2f6c11
    patient: { id: 5946f880-b197-400b-9caa-a3c661d23041 }
    visit_type: { id: 7b0f5697-27e3-40c4-8bae-f4049abfb4ed, name: Outpatient }
    start_datetime: 2014-01-04T10:00:00Z
    stop_datetime: 2014-01-10T14:00:00Z
"#;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    fn visit_starting(start: &str) -> String {
        format!(
            "patient: {{ id: 5946f880-b197-400b-9caa-a3c661d23041 }}\n\
             visit_type: {{ id: 7b0f5697-27e3-40c4-8bae-f4049abfb4ed, name: Outpatient }}\n\
             start_datetime: {start}\n"
        )
    }

    #[test]
    fn test_validate_files_reports_overlap() {
        let history = yaml_file(HISTORY);
        let visit = yaml_file(&visit_starting("2014-01-05T09:00:00Z"));

        let errors = validate_files(history.path(), visit.path(), ValidationConfig::default())
            .expect("should validate");
        assert!(errors.has_field_errors(Field::StartDatetime));
    }

    #[test]
    fn test_validate_files_accepts_later_visit() {
        let history = yaml_file(HISTORY);
        let visit = yaml_file(&visit_starting("2014-01-11T09:00:00Z"));

        let errors = validate_files(history.path(), visit.path(), ValidationConfig::default())
            .expect("should validate");
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_validate_files_fails_on_bad_history() {
        let history = yaml_file("visits: [ { start_datetime: yesterday } ]\n");
        let visit = yaml_file(&visit_starting("2014-01-11T09:00:00Z"));

        let err = validate_files(history.path(), visit.path(), ValidationConfig::default())
            .expect_err("bad history");
        assert!(err.to_string().contains("failed to load visit history"));
    }

    #[test]
    fn test_flags_override_environment() {
        let cfg = apply_overrides(ValidationConfig::default(), true, Some(10)).unwrap();
        assert!(cfg.allow_overlapping_visits());
        assert_eq!(cfg.void_reason_max_length(), 10);

        let unchanged = apply_overrides(ValidationConfig::default(), false, None).unwrap();
        assert_eq!(unchanged, ValidationConfig::default());

        assert!(apply_overrides(ValidationConfig::default(), false, Some(0)).is_err());
    }

    #[test]
    fn test_report_serializes_errors_inline() {
        let mut errors = FieldErrors::new();
        errors.reject(Field::VisitType, "Visit.error.visitType.required");

        let report = ValidationReport {
            valid: false,
            checked_at: Utc::now(),
            errors: &errors,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["field"], "visitType");
    }
}
