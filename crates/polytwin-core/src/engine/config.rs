use crate::core::orientation::CrystalFamily;
use crate::core::orientation::csl::csl_offset;
use crate::core::statistics::LognormalParams;
use crate::core::statistics::lognormal::DEFAULT_POOL_SIZE;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// The length over which a grain's parent gaps are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// Gaps sum to the grain diameter.
    #[default]
    Diameter,
    /// Gaps sum to `diameter / sphericity`, lengthening the lamella stack of elongated grains.
    SphericityScaled,
}

impl GapPolicy {
    pub fn gap_budget(&self, diameter: f64, sphericity: f64) -> f64 {
        match self {
            GapPolicy::Diameter => diameter,
            GapPolicy::SphericityScaled => diameter / sphericity,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GapPolicy::Diameter => "diameter",
            GapPolicy::SphericityScaled => "sphericity-scaled",
        }
    }
}

impl fmt::Display for GapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GapPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "diameter" => Ok(GapPolicy::Diameter),
            "sphericity-scaled" | "sphericity" => Ok(GapPolicy::SphericityScaled),
            other => Err(invalid(
                "gap_policy",
                format!("unknown policy '{other}' (expected 'diameter' or 'sphericity-scaled')"),
            )),
        }
    }
}

/// Stopping rules of the orientation pair solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Maximum accepted `|target - achieved|`, in radians.
    pub tolerance: f64,
    /// Hard ceiling on simplex iterations, restarts included.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_iterations: 2000,
        }
    }
}

/// How the twin orientation of each grain is derived from its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationStrategy {
    /// Exact coincidence site lattice relation.
    Csl { sigma: u32 },
    /// A numerically searched pair at the given disorientation angle.
    Misorientation {
        angle_degrees: f64,
        family: CrystalFamily,
        solver: SolverConfig,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwinLayoutConfig {
    /// Twin count assigned to the largest grain; smaller grains scale linearly.
    pub max_expected_twins: usize,
    /// Written for grains without twins.
    pub domain_length: f64,
    pub gap_policy: GapPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub twin_thickness: LognormalParams,
    pub pool_size: usize,
    pub layout: TwinLayoutConfig,
    pub orientation: OrientationStrategy,
    pub seed: u64,
}

#[derive(Default)]
pub struct GenerationConfigBuilder {
    twin_thickness: Option<LognormalParams>,
    pool_size: Option<usize>,
    max_expected_twins: Option<usize>,
    domain_length: Option<f64>,
    gap_policy: Option<GapPolicy>,
    orientation: Option<OrientationStrategy>,
    seed: Option<u64>,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn twin_thickness(mut self, params: LognormalParams) -> Self {
        self.twin_thickness = Some(params);
        self
    }
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }
    pub fn max_expected_twins(mut self, count: usize) -> Self {
        self.max_expected_twins = Some(count);
        self
    }
    pub fn domain_length(mut self, length: f64) -> Self {
        self.domain_length = Some(length);
        self
    }
    pub fn gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = Some(policy);
        self
    }
    pub fn orientation(mut self, strategy: OrientationStrategy) -> Self {
        self.orientation = Some(strategy);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        let layout = TwinLayoutConfig {
            max_expected_twins: self
                .max_expected_twins
                .ok_or(ConfigError::MissingParameter("max_expected_twins"))?,
            domain_length: self
                .domain_length
                .ok_or(ConfigError::MissingParameter("domain_length"))?,
            gap_policy: self.gap_policy.unwrap_or_default(),
        };
        let config = GenerationConfig {
            twin_thickness: self
                .twin_thickness
                .ok_or(ConfigError::MissingParameter("twin_thickness"))?,
            pool_size: self.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
            layout,
            orientation: self
                .orientation
                .ok_or(ConfigError::MissingParameter("orientation"))?,
            seed: self.seed.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.layout.domain_length.is_finite() && self.layout.domain_length > 0.0) {
            return Err(invalid(
                "domain_length",
                format!("must be positive, got {}", self.layout.domain_length),
            ));
        }
        if self.pool_size == 0 {
            return Err(invalid("pool_size", "must be at least 1"));
        }
        match self.orientation {
            OrientationStrategy::Csl { sigma } => {
                csl_offset(sigma).map_err(|e| invalid("sigma", e.to_string()))?;
            }
            OrientationStrategy::Misorientation {
                angle_degrees,
                solver,
                ..
            } => {
                let angle = angle_degrees.to_radians();
                if !(angle > 0.0 && angle <= PI) {
                    return Err(invalid(
                        "misorientation",
                        format!("angle must lie in (0, 180] degrees, got {angle_degrees}"),
                    ));
                }
                if !(solver.tolerance.is_finite() && solver.tolerance > 0.0) {
                    return Err(invalid("tolerance", "must be positive"));
                }
                if solver.max_iterations == 0 {
                    return Err(invalid("max_iterations", "must be at least 1"));
                }
            }
        }
        Ok(())
    }
}
