use crate::error::{CliError, Result};
use polytwin::core::statistics::LognormalParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileStatisticsConfig {
    /// Microstructure statistics file, resolved relative to the config file.
    pub file: Option<PathBuf>,
    pub twin_thickness: Option<LognormalParams>,
    pub pool_size: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileLayoutConfig {
    pub max_expected_twins: Option<usize>,
    pub domain_length: Option<f64>,
    pub dimensions: Option<u8>,
    pub gap_policy: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOrientationConfig {
    pub sigma: Option<u32>,
    /// Target disorientation in degrees; selects the numerical solver.
    pub misorientation: Option<f64>,
    pub crystal_family: Option<String>,
    /// Solver tolerance in degrees.
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOutputConfig {
    pub csv: Option<bool>,
    pub script: Option<bool>,
    pub program: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub seed: Option<u64>,
    pub statistics: Option<FileStatisticsConfig>,
    pub layout: Option<FileLayoutConfig>,
    pub orientation: Option<FileOrientationConfig>,
    pub output: Option<FileOutputConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        if let Some(stats_file) = config.statistics.as_mut().and_then(|s| s.file.as_mut()) {
            if stats_file.is_relative() {
                if let Some(dir) = path.parent() {
                    *stats_file = dir.join(&*stats_file);
                }
            }
        }
        Ok(config)
    }
}
