//! `stormgen` - lightning storm test-data generator
//!
//! Reads a storm description from `storm_config.ini`, partitions the storm
//! around its closest-approach window into generator directives, and
//! expands those directives into `hh:mm distance energy` detection lines.

pub mod cli;
pub mod config;
pub mod detections;
pub mod error;
pub mod observability;
pub mod report;
pub mod storm;
