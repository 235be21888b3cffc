//! Storm timeline, close-window classification and phase partitioning.

pub mod classify;
pub mod partition;
pub mod timeline;

pub use classify::{Leg, PATTERN_TABLE, PartitionPattern, PhaseClassification, PhaseTreatment};
pub use partition::{DirectiveLabel, GeneratorDirective, Partition, Segment, partition};
pub use timeline::Timeline;
