//! CLI argument definitions
//!
//! All Clap derive structs for `stormgen` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

/// Default detection output file.
pub const DEFAULT_OUTPUT_FILE: &str = "storm.dat";

// ============================================================================
// Root CLI
// ============================================================================

/// Lightning storm test-data generator.
#[derive(Parser, Debug)]
#[command(name = "stormgen", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "STORMGEN_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "STORMGEN_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Partition the storm and write the detection file.
    Generate(GenerateArgs),

    /// Print the timing summary and directive table.
    Plan(PlanArgs),

    /// Validate the storm configuration without generating output.
    Validate(ValidateArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Location of `storm_config.ini`.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Directory containing `storm_config.ini`.
    #[arg(
        long,
        alias = "config_dir",
        default_value = ".",
        env = "STORMGEN_CONFIG_DIR"
    )]
    pub config_dir: PathBuf,
}

/// Arguments for `generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Configuration location.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// File to write detections to; `-` writes to stdout.
    #[arg(short, long, alias = "output_file", default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Seed for the detection generator.
    #[arg(long, default_value_t = 0, env = "STORMGEN_SEED")]
    pub seed: u64,
}

/// Arguments for `plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Configuration location.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration location.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================
