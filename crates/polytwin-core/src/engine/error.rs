use thiserror::Error;

use super::config::ConfigError;
use super::pairing::PairingError;
use crate::core::orientation::csl::CslError;
use crate::core::orientation::symmetry::SymmetryError;
use crate::core::statistics::SamplingError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to initialize the twin thickness sampler: {source}")]
    SamplerInit { source: SamplingError },

    #[error("Sampling failed for grain {grain_id}: {source}")]
    Sampling {
        grain_id: usize,
        source: SamplingError,
    },

    #[error("Symmetry lookup failed: {source}")]
    Symmetry {
        #[from]
        source: SymmetryError,
    },

    #[error("Orientation pairing failed for grain {grain_id}: {source}")]
    Pairing {
        grain_id: usize,
        source: PairingError,
    },

    #[error("CSL pair generation failed for grain {grain_id}: {source}")]
    Csl { grain_id: usize, source: CslError },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
