//! Version information display
//!
//! Prints the version together with the configuration file the generator
//! reads and the storm limits it enforces.

use serde::Serialize;

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::config::schema::{CONFIG_FILE_NAME, MAX_PHASE_STRIKES, MAX_STORM_MINUTES};
use crate::error::StormGenError;

#[derive(Debug, Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    config_file: &'static str,
    limits: Limits,
}

#[derive(Debug, Serialize)]
struct Limits {
    storm_minutes: u32,
    phase_strikes: u32,
}

impl VersionInfo {
    const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            config_file: CONFIG_FILE_NAME,
            limits: Limits {
                storm_minutes: MAX_STORM_MINUTES,
                phase_strikes: MAX_PHASE_STRIKES,
            },
        }
    }
}

/// Print version information.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(args: &VersionArgs) -> Result<(), StormGenError> {
    let info = VersionInfo::current();
    match args.format {
        OutputFormat::Human => {
            println!("{} {}", info.name, info.version);
            println!(
                "reads {} (storms up to {} minutes, {} strikes per phase)",
                info.config_file, info.limits.storm_minutes, info.limits.phase_strikes
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&info)?),
    }
    Ok(())
}
