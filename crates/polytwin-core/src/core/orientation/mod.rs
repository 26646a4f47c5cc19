//! Crystallographic orientation mathematics.
//!
//! This module covers everything needed to describe and relate grain orientations:
//! conversions between Euler-Bunge angles, quaternions and orientation matrices,
//! the proper rotation operators of each crystal family, the misorientation
//! (disorientation) between two grains and the coincidence site lattice table used
//! to build exact twin relations.

pub mod csl;
pub mod euler;
pub mod misorientation;
pub mod symmetry;

pub use euler::{EulerAngles, Orientation};
pub use symmetry::{CrystalFamily, SymmetryGroup, SymmetryRegistry};
