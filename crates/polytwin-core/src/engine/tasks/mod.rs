//! Per-grain tasks of a generation run.
//!
//! Each task walks every grain once, in parallel when the `parallel` feature is enabled,
//! and fills in one part of the [`GrainRecord`](crate::core::models::GrainRecord).

pub mod orientation_assignment;
pub mod twin_layout;
