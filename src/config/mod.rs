//! Storm configuration.
//!
//! Reads the `[Storm]` section of `storm_config.ini`, checks every field and
//! produces a [`StormConfig`] ready for partitioning.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
