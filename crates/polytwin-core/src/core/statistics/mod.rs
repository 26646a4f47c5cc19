//! Statistical descriptions of microstructure features.
//!
//! - [`params`] - lognormal parameter sets and the statistics file loader
//! - [`lognormal`] - the bounded (truncated) lognormal sampler

pub mod lognormal;
pub mod params;

pub use lognormal::{BoundedLognormal, SamplingError};
pub use params::{LognormalParams, MicrostructureStatistics};

/// Decimal places kept for sampled values and serialized real numbers.
pub const OUTPUT_DECIMALS: i32 = 5;

#[inline]
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_decimals_keeps_five_places() {
        assert_eq!(round_to_decimals(1.234567, OUTPUT_DECIMALS), 1.23457);
        assert_eq!(round_to_decimals(59.8839, OUTPUT_DECIMALS), 59.8839);
        assert_eq!(round_to_decimals(2.0, OUTPUT_DECIMALS), 2.0);
    }
}
