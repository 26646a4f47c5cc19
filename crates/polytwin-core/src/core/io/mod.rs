//! Text formats exchanged with the external tessellator.
//!
//! The first tessellation pass produces per-grain statistics ([`stcell`]); this crate
//! answers with the lamellar morphology ([`lamellae`]) and crystal orientation files
//! ([`crystal_ori`]) for the second pass. The grammar of these files is an interface
//! contract with the unchanged external tool. [`export`] writes CSV summaries and
//! [`tessellator`] renders the command lines that consume the files.

pub mod crystal_ori;
pub mod export;
pub mod lamellae;
pub mod stcell;
pub mod tessellator;
pub mod traits;

use crate::core::statistics::{OUTPUT_DECIMALS, round_to_decimals};

/// Formats a real number rounded to five decimals, in its shortest exact form.
pub fn format_real(value: f64) -> String {
    format!("{}", round_to_decimals(value, OUTPUT_DECIMALS))
}
