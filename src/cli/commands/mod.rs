//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod generate;
pub mod plan;
pub mod validate;
pub mod version;

use crate::cli::args::{Cli, Commands, ConfigArgs};
use crate::config::{ConfigLoader, LoadResult};
use crate::error::StormGenError;
use crate::observability::storm_span;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub fn dispatch(cli: Cli) -> Result<(), StormGenError> {
    match cli.command {
        Commands::Generate(args) => {
            let _run = storm_span("generate", &args.config.config_dir).entered();
            generate::run(&args)
        }
        Commands::Plan(args) => {
            let _run = storm_span("plan", &args.config.config_dir).entered();
            plan::run(&args)
        }
        Commands::Validate(args) => {
            let _run = storm_span("validate", &args.config.config_dir).entered();
            validate::run(&args)
        }
        Commands::Version(args) => version::run(&args),
    }
}

/// Loads `storm_config.ini` from the configured directory and logs any
/// loader warnings.
fn load_config(args: &ConfigArgs) -> Result<LoadResult, StormGenError> {
    tracing::info!(dir = %args.config_dir.display(), "loading storm configuration");

    let load_result = ConfigLoader::with_defaults().load_dir(&args.config_dir)?;
    for warning in &load_result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    Ok(load_result)
}
