//! # Polytwin Core Library
//!
//! Generates the microstructure descriptors that an external tessellator needs to build
//! a twinned polycrystalline representative volume element: parent/twin orientation pairs,
//! grain-size dependent twin lamella layouts, and bounded lognormal samples.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless rotation-group mathematics (`orientation`),
//!   bounded statistics (`statistics`), grain records (`models`) and the text formats
//!   exchanged with the tessellator (`io`).
//!
//! - **[`engine`]: The Logic Core.** Run configuration, error types, progress reporting,
//!   the derivative-free orientation pair solver and the per-grain tasks (twin layout,
//!   orientation assignment) that optionally run in parallel.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into the complete
//!   generation procedure that turns first-pass grain statistics into second-pass input.

pub mod core;
pub mod engine;
pub mod workflows;
