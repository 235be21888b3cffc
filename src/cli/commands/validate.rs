//! `validate` command: load and check the configuration only.

use crate::cli::args::ValidateArgs;
use crate::cli::commands::load_config;
use crate::config::loader::config_path;
use crate::error::{ConfigError, Severity, StormGenError, ValidationIssue};

/// Validate `storm_config.ini` without partitioning.
///
/// # Errors
///
/// Returns a configuration error listing every invalid field. With
/// `--strict`, loader warnings are reported as errors too.
pub fn run(args: &ValidateArgs) -> Result<(), StormGenError> {
    let path = config_path(&args.config.config_dir);
    let load_result = load_config(&args.config)?;

    if args.strict && !load_result.warnings.is_empty() {
        let errors = load_result
            .warnings
            .into_iter()
            .map(|warning| ValidationIssue {
                path: warning.location.unwrap_or_else(|| "<unknown>".to_string()),
                message: warning.message,
                severity: Severity::Error,
            })
            .collect();
        return Err(ConfigError::ValidationError {
            path: path.display().to_string(),
            errors,
        }
        .into());
    }

    tracing::info!(file = %path.display(), "configuration valid");
    println!("{}: ok", path.display());
    Ok(())
}
