//! Coincidence site lattice (CSL) twin pairs.
//!
//! Each supported Σ value maps to the Euler-Bunge rotation that produces the exact
//! coincidence relation for cubic lattices. Pairs are built in closed form: no search,
//! no tolerance.

use super::euler::{Orientation, random_orientation};
use phf::{Map, phf_map};
use rand::Rng;
use thiserror::Error;

/// Σ value → Euler-Bunge offset rotation in degrees.
static CSL_OFFSETS: Map<u32, [f64; 3]> = phf_map! {
    3u32 => [45.0, 70.53, 45.0],
    5u32 => [0.0, 90.0, 36.86],
    7u32 => [26.56, 73.4, 63.44],
    9u32 => [26.56, 83.62, 26.56],
    11u32 => [33.68, 79.53, 33.68],
};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CslError {
    #[error("Unsupported CSL sigma value: {sigma} (supported values: {supported:?})")]
    UnsupportedSigma { sigma: u32, supported: Vec<u32> },
}

pub fn supported_sigmas() -> Vec<u32> {
    let mut sigmas: Vec<u32> = CSL_OFFSETS.keys().copied().collect();
    sigmas.sort_unstable();
    sigmas
}

/// The offset rotation that relates the two grains of a Σ boundary.
pub fn csl_offset(sigma: u32) -> Result<Orientation, CslError> {
    CSL_OFFSETS
        .get(&sigma)
        .map(|&[phi1, big_phi, phi2]| Orientation::from_degrees(phi1, big_phi, phi2))
        .ok_or_else(|| CslError::UnsupportedSigma {
            sigma,
            supported: supported_sigmas(),
        })
}

/// Builds `[reference, offset · reference]` for the given Σ.
///
/// When no reference is given one is drawn uniformly from `rng`.
pub fn csl_pair(
    sigma: u32,
    reference: Option<Orientation>,
    rng: &mut impl Rng,
) -> Result<[Orientation; 2], CslError> {
    let offset = csl_offset(sigma)?;
    let reference = reference.unwrap_or_else(|| random_orientation(rng));
    let paired = Orientation::from_matrix(&(offset.matrix() * reference.matrix()));
    Ok([reference, paired])
}
