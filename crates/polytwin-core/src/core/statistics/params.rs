use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Parameters of a lognormal distribution truncated to `[min, max]`.
///
/// `mu` and `sigma` are the mean and standard deviation of the underlying normal
/// distribution. `mean` and `variance` describe the lognormal itself; they are optional
/// and only needed when a morphology description for the tessellator is built from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LognormalParams {
    pub mu: f64,
    pub sigma: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub variance: Option<f64>,
}

impl LognormalParams {
    pub fn new(mu: f64, sigma: f64, min: f64, max: f64) -> Self {
        Self {
            mu,
            sigma,
            min,
            max,
            mean: None,
            variance: None,
        }
    }

    pub fn with_moments(mut self, mean: f64, variance: f64) -> Self {
        self.mean = Some(mean);
        self.variance = Some(variance);
        self
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.variance.map(f64::sqrt)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Error)]
pub enum StatisticsLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Measured statistics of a microstructure.
///
/// `twin-thickness` drives the twin layout. The parent grain statistics are only used to
/// describe the first-pass morphology handed to the tessellator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct MicrostructureStatistics {
    pub twin_thickness: LognormalParams,
    #[serde(default)]
    pub parent_eq_radius: Option<LognormalParams>,
    /// Statistics of `1 - sphericity`.
    #[serde(default)]
    pub parent_sphericity: Option<LognormalParams>,
}

impl MicrostructureStatistics {
    pub fn load(path: &Path) -> Result<Self, StatisticsLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| StatisticsLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| StatisticsLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}
