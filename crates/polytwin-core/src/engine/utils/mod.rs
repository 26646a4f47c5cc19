//! Numerical and random-state helpers shared by the engine tasks.

pub mod rng;
pub mod simplex;
