//! Per-grain data carried through a generation run.

pub mod grain;

pub use grain::{GrainRecord, PairQuality, TwinLamellaSequence};
