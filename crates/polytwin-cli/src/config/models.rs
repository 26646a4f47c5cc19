use polytwin::core::io::tessellator::Domain;
use polytwin::core::statistics::LognormalParams;
use polytwin::engine::config::GenerationConfig;
use std::path::PathBuf;

/// Parent statistics needed to emit the first tessellation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentStatistics {
    pub eq_radius: LognormalParams,
    pub sphericity: LognormalParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub grains_path: PathBuf,
    pub output_dir: PathBuf,
    pub core_config: GenerationConfig,
    pub domain: Domain,
    pub parent_statistics: Option<ParentStatistics>,
    pub write_csv: bool,
    pub write_script: bool,
    pub program: String,
}
