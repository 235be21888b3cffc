//! `generate` command: partition the storm and write detections.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use crate::cli::args::GenerateArgs;
use crate::cli::commands::load_config;
use crate::detections::{DetectionExpander, write_detections};
use crate::error::StormGenError;
use crate::report::TimingSummary;
use crate::storm::partition;

/// Partition the configured storm and write one line per detection.
///
/// Nothing is written unless the configuration is valid and the storm
/// partitions cleanly.
///
/// # Errors
///
/// Returns a configuration or timeline error, or an I/O error when the
/// output cannot be written.
pub fn run(args: &GenerateArgs) -> Result<(), StormGenError> {
    let config = load_config(&args.config)?.config;
    let partition = partition(&config)?;
    TimingSummary::new(&config, &partition).log();

    let detections = DetectionExpander::new(&config, args.seed).expand(&partition);

    if args.output_file == Path::new("-") {
        write_detections(io::stdout().lock(), &detections)?;
    } else {
        let file = File::create(&args.output_file)?;
        write_detections(BufWriter::new(file), &detections)?;
    }

    tracing::info!(
        file = %args.output_file.display(),
        detections = detections.len(),
        directives = partition.directives.len(),
        "detections written"
    );
    Ok(())
}
