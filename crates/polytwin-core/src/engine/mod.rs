//! # Engine Module
//!
//! Runs the per-grain work of a generation run on top of the stateless [`crate::core`]
//! primitives: sizing and laying out twin lamellae, pairing parent and twin
//! orientations, and reporting progress while doing so.
//!
//! - **Configuration** ([`config`]) - validated run parameters and their builder
//! - **Pair Solving** ([`pairing`]) - the orientation pair solver for arbitrary target angles
//! - **Progress Monitoring** ([`progress`]) - callback-based progress reporting
//! - **Error Handling** ([`error`]) - engine errors carrying the failing grain id
//!
//! Per-grain tasks draw their randomness from generators derived from the run seed and
//! the grain id, so results do not depend on the number of worker threads.

pub mod config;
pub mod error;
pub mod pairing;
pub mod progress;
pub(crate) mod tasks;
pub mod utils;
