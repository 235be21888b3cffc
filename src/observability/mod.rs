//! Observability module
//!
//! Structured logging for `stormgen` runs.

pub mod logging;

pub use logging::{LogFormat, init_logging, storm_span};
