//! `plan` command: print the timing summary and directive table.

use crate::cli::args::{OutputFormat, PlanArgs};
use crate::cli::commands::load_config;
use crate::error::StormGenError;
use crate::report::TimingSummary;
use crate::storm::partition;

/// Partition the configured storm and print the result.
///
/// # Errors
///
/// Returns a configuration error for an invalid file, a timeline error when
/// the storm cannot be partitioned, or a JSON error when serialization fails.
pub fn run(args: &PlanArgs) -> Result<(), StormGenError> {
    let config = load_config(&args.config)?.config;
    let partition = partition(&config)?;
    let summary = TimingSummary::new(&config, &partition);

    match args.format {
        OutputFormat::Human => print!("{}", summary.render_human()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
