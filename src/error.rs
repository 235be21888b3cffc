//! Error types for `stormgen`
//!
//! Configuration problems are collected into a single
//! [`ConfigError::ValidationError`] so every bad field is reported at once.
//! Timeline problems abort immediately: they mean the configuration is
//! logically inconsistent and nothing downstream can repair it.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `stormgen` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (unreadable file, invalid field)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (output file not writable)
    pub const IO_ERROR: i32 = 3;

    /// Timeline error (no close window, rate denominator not positive)
    pub const TIMELINE_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `stormgen` operations.
///
/// Any variant means the run was aborted; no partial directive sequence or
/// detection file is produced.
#[derive(Debug, Error)]
pub enum StormGenError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storm timeline cannot be partitioned
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StormGenError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Timeline(_) => ExitCode::TIMELINE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }

    /// Returns the individual validation issues carried by this error, if any.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Config(ConfigError::ValidationError { errors, .. }) => errors,
            _ => &[],
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// INI parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {} invalid field(s)", .errors.len())]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Configuration file not found
    #[error("no configuration file {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// The `[Storm]` section is absent
    #[error("missing section [{section}] in {path}")]
    MissingSection {
        /// Section name that was expected
        section: String,
        /// Path to the configuration file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set ({location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Message supplied with the `${VAR:?message}` reference
        location: String,
    },
}

// ============================================================================
// Timeline Errors
// ============================================================================

/// Fatal inconsistencies found while partitioning the storm timeline.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimelineError {
    /// All three phase durations are zero
    #[error("storm has no duration: early, middle and late are all 0 minutes")]
    EmptyTimeline,

    /// Phase durations add up to more than the longest storm accepted
    #[error("storm is longer than {limit} minutes")]
    TooLong {
        /// Longest accepted storm, minutes
        limit: u32,
    },

    /// Close window does not overlap any phase
    #[error("close window does not fall in any phase")]
    NoCloseWindow,

    /// Close window overlaps early and late but not middle
    #[error("close window covers early and late but not middle")]
    NonAdjacentClose,

    /// Entry rate needed but the storm has no approach time
    #[error("storm needs an approach rate but reaches closest after {minutes:.3} minutes")]
    NoApproach {
        /// Minutes before closest approach
        minutes: f64,
    },

    /// Exit rate needed but the storm has no departure time
    #[error("storm needs a departure rate but leaves closest with {minutes:.3} minutes remaining")]
    NoDeparture {
        /// Minutes after closest approach
        minutes: f64,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Configuration key of the problematic field (e.g., `Storm.storm_late_energy`)
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents the configuration from being used
    Error,
    /// Warning - potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::TIMELINE_ERROR, 5);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
    }

    #[test]
    fn test_timeline_error_exit_code() {
        let err: StormGenError = TimelineError::NonAdjacentClose.into();
        assert_eq!(err.exit_code(), ExitCode::TIMELINE_ERROR);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: StormGenError = ConfigError::MissingFile {
            path: PathBuf::from("/test/storm_config.ini"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: StormGenError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_validation_error_exposes_issues() {
        let err: StormGenError = ConfigError::ValidationError {
            path: "storm_config.ini".to_string(),
            errors: vec![
                ValidationIssue {
                    path: "Storm.storm_min_distance".to_string(),
                    message: "must be 0-63".to_string(),
                    severity: Severity::Error,
                },
                ValidationIssue {
                    path: "Storm.storm_late_energy".to_string(),
                    message: "expected low-high".to_string(),
                    severity: Severity::Error,
                },
            ],
        }
        .into();
        assert_eq!(err.issues().len(), 2);
        assert!(err.to_string().contains("2 invalid field(s)"));
    }

    #[test]
    fn test_non_validation_error_has_no_issues() {
        let err: StormGenError = TimelineError::EmptyTimeline.into();
        assert!(err.issues().is_empty());
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "Storm.storm_closest_to".to_string(),
            message: "must be 0-100".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "error: must be 0-100 at Storm.storm_closest_to"
        );
    }

    #[test]
    fn test_validation_issue_warning_display() {
        let issue = ValidationIssue {
            path: "Storm.storm_erly_strikes".to_string(),
            message: "unknown key".to_string(),
            severity: Severity::Warning,
        };
        assert_eq!(
            issue.to_string(),
            "warning: unknown key at Storm.storm_erly_strikes"
        );
    }

    #[test]
    fn test_no_approach_display() {
        let err = TimelineError::NoApproach { minutes: 0.0 };
        assert!(err.to_string().contains("0.000 minutes"));
    }
}
