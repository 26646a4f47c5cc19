//! # Core Module
//!
//! Fundamental, stateless building blocks for twinned microstructure generation.
//!
//! ## Architecture
//!
//! - **Crystallographic Orientation** ([`orientation`]) - Euler-Bunge angles, quaternions,
//!   orientation matrices, crystal symmetry operators, misorientation and CSL pairs
//! - **Statistics** ([`statistics`]) - Lognormal parameter sets and the bounded sampler
//! - **Grain Representation** ([`models`]) - Per-grain records and twin lamella sequences
//! - **File I/O** ([`io`]) - First-pass statistics input and the second-pass tessellator
//!   input files, CSV exports and command scripts
//!
//! ## Scientific Foundation
//!
//! - **Rotation group SO(3)** sampled uniformly through unit quaternions
//! - **Crystallographic disorientation** as the minimum rotation angle over the
//!   symmetry-equivalent descriptions of a grain boundary
//! - **Coincidence site lattice** boundaries for special twin relations (Σ3, Σ5, ...)
//! - **Truncated lognormal statistics** for twin thickness and grain morphology

pub mod io;
pub mod models;
pub mod orientation;
pub mod statistics;
