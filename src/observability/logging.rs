//! Logging initialization.
//!
//! `-v` raises the level of `stormgen` events only; dependencies stay at
//! `warn`. Every command that reads a storm configuration runs inside a
//! `storm` span carrying the command name and config directory, so JSON
//! lines from one run can be grouped. `STORMGEN_LOG_LEVEL` overrides the
//! whole filter.

use std::io::IsTerminal;
use std::path::Path;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_LEVEL_ENV: &str = "STORMGEN_LOG_LEVEL";

/// Tracing target prefix of every event this crate emits.
pub const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Log output format.
///
/// Controls how log messages are rendered to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Maps a verbosity level to a tracing directive string.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"` (saturates)
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter used when `STORMGEN_LOG_LEVEL` is unset.
#[must_use]
pub fn filter_directive(verbosity: u8) -> String {
    format!("warn,{CRATE_TARGET}={}", verbosity_to_directive(verbosity))
}

/// Span wrapping one command run against a storm configuration.
#[must_use]
pub fn storm_span(command: &'static str, config_dir: &Path) -> tracing::Span {
    tracing::info_span!("storm", command, config_dir = %config_dir.display())
}

/// Whether stderr output should carry ANSI escapes.
#[must_use]
pub fn use_ansi(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

/// Initializes the global tracing subscriber.
///
/// If `STORMGEN_LOG_LEVEL` is set it takes precedence over `verbosity`.
///
/// Uses `try_init()` so calling this more than once (e.g. in tests) is safe.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity)));

    let show_target = verbosity >= 2;

    match format {
        LogFormat::Human => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(use_ansi(color))
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
