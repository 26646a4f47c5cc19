//! # Workflows Module
//!
//! Top-level entry points of the library. A workflow validates its input, drives the
//! engine tasks phase by phase, reports progress and returns the populated grain records.
//!
//! - **Generate Workflow** ([`generate`]) - twin lamella layout and orientation pairing for
//!   every grain of a first-pass tessellation.

pub mod generate;
