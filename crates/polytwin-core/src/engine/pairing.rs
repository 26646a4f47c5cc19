use super::config::SolverConfig;
use super::utils::simplex::NelderMead;
use crate::core::models::PairQuality;
use crate::core::orientation::euler::{euler_to_matrix, random_orientation};
use crate::core::orientation::misorientation::SymmetricEquivalents;
use crate::core::orientation::{EulerAngles, Orientation, SymmetryGroup};
use rand::Rng;
use std::f64::consts::PI;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Start of every search, in radians.
pub const INITIAL_GUESS: [f64; 3] = [1.0, 1.0, 1.0];

#[derive(Debug, Error, PartialEq, Clone)]
pub enum PairingError {
    #[error("Target misorientation {0} rad is outside (0, π]")]
    InvalidTarget(f64),
    #[error("Invalid solver settings: {0}")]
    InvalidSettings(String),
}

/// The orientation found for one target misorientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairingOutcome {
    pub orientation: Orientation,
    /// Disorientation actually reached, in radians.
    pub achieved: f64,
    /// `|target - achieved|`, in radians.
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl PairingOutcome {
    pub fn quality(&self) -> PairQuality {
        if self.converged {
            PairQuality::Converged {
                residual: self.residual,
            }
        } else {
            PairQuality::Approximate {
                residual: self.residual,
            }
        }
    }
}

/// Searches for a second orientation at a prescribed disorientation from a reference.
///
/// The search runs a Nelder-Mead simplex over the three Euler angles from
/// [`INITIAL_GUESS`], minimizing the squared difference between the target and the
/// symmetry-reduced misorientation. Running out of iterations is not an error: the best
/// candidate is returned with `converged == false`.
#[derive(Debug, Clone, Copy)]
pub struct OrientationPairSolver<'a> {
    group: &'a SymmetryGroup,
    settings: SolverConfig,
}

impl<'a> OrientationPairSolver<'a> {
    pub fn new(group: &'a SymmetryGroup, settings: SolverConfig) -> Result<Self, PairingError> {
        if !(settings.tolerance.is_finite() && settings.tolerance > 0.0) {
            return Err(PairingError::InvalidSettings(format!(
                "tolerance must be positive, got {}",
                settings.tolerance
            )));
        }
        if settings.max_iterations == 0 {
            return Err(PairingError::InvalidSettings(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(Self { group, settings })
    }

    pub fn group(&self) -> &SymmetryGroup {
        self.group
    }

    #[instrument(level = "debug", skip_all, fields(target = target))]
    pub fn solve(&self, reference: &Orientation, target: f64) -> Result<PairingOutcome, PairingError> {
        if !(target > 0.0 && target <= PI) {
            return Err(PairingError::InvalidTarget(target));
        }

        let equivalents = SymmetricEquivalents::new(reference, self.group);
        let objective = |angles: &[f64; 3]| {
            let candidate = euler_to_matrix(&EulerAngles::from(*angles));
            (target - equivalents.misorientation_to(&candidate)).powi(2)
        };

        let simplex = NelderMead {
            max_iterations: self.settings.max_iterations,
            target: self.settings.tolerance.powi(2),
            ..NelderMead::default()
        };
        let result = simplex.minimize(objective, INITIAL_GUESS);

        let orientation = Orientation::from_radians(EulerAngles::from(result.point));
        let achieved = equivalents.misorientation_to(&orientation.matrix());
        let residual = (target - achieved).abs();

        if result.converged {
            debug!(
                iterations = result.iterations,
                restarts = result.restarts,
                residual,
                "Orientation pair converged."
            );
        } else {
            warn!(
                iterations = result.iterations,
                residual_degrees = residual.to_degrees(),
                target_degrees = target.to_degrees(),
                "Orientation pair solver hit its iteration ceiling; keeping the best candidate."
            );
        }

        Ok(PairingOutcome {
            orientation,
            achieved,
            residual,
            iterations: result.iterations,
            converged: result.converged,
        })
    }

    /// Solves for a pair, drawing the reference uniformly from `rng` when none is given.
    pub fn solve_pair(
        &self,
        reference: Option<Orientation>,
        target: f64,
        rng: &mut impl Rng,
    ) -> Result<([Orientation; 2], PairingOutcome), PairingError> {
        let reference = reference.unwrap_or_else(|| random_orientation(rng));
        let outcome = self.solve(&reference, target)?;
        Ok(([reference, outcome.orientation], outcome))
    }
}
