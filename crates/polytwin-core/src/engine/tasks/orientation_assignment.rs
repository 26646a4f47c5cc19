use crate::core::models::{GrainRecord, PairQuality};
use crate::core::orientation::SymmetryRegistry;
use crate::core::orientation::csl::csl_pair;
use crate::engine::config::{ConfigError, OrientationStrategy};
use crate::engine::error::EngineError;
use crate::engine::pairing::OrientationPairSolver;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::utils::rng::{ORIENTATION_STREAM, grain_rng};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

enum Pairer<'a> {
    Csl(u32),
    Solver { solver: OrientationPairSolver<'a>, target: f64 },
}

impl Pairer<'_> {
    fn assign(&self, grain: &mut GrainRecord, seed: u64) -> Result<(), EngineError> {
        let mut rng = grain_rng(seed, ORIENTATION_STREAM, grain.id);
        let (pair, quality) = match self {
            Pairer::Csl(sigma) => {
                let pair = csl_pair(*sigma, None, &mut rng).map_err(|source| EngineError::Csl {
                    grain_id: grain.id,
                    source,
                })?;
                (pair, PairQuality::Exact)
            }
            Pairer::Solver { solver, target } => {
                let (pair, outcome) = solver.solve_pair(None, *target, &mut rng).map_err(|source| {
                    EngineError::Pairing {
                        grain_id: grain.id,
                        source,
                    }
                })?;
                (pair, outcome.quality())
            }
        };
        let [parent, twin] = pair;
        grain.parent_orientation = Some(parent);
        grain.twin_orientation = Some(twin);
        grain.pair_quality = Some(quality);
        Ok(())
    }
}

/// Draws a parent orientation for every grain and derives its twin orientation.
///
/// Returns the number of grains whose pair is only approximate.
#[instrument(skip_all, name = "orientation_assignment_task")]
pub fn run(
    grains: &mut [GrainRecord],
    strategy: &OrientationStrategy,
    registry: &SymmetryRegistry,
    seed: u64,
    reporter: &ProgressReporter,
) -> Result<usize, EngineError> {
    let pairer = match *strategy {
        OrientationStrategy::Csl { sigma } => {
            info!(sigma, "Assigning CSL orientation pairs.");
            Pairer::Csl(sigma)
        }
        OrientationStrategy::Misorientation {
            angle_degrees,
            family,
            solver,
        } => {
            info!(angle_degrees, %family, "Solving orientation pairs.");
            let group = registry.get(family)?;
            let solver = OrientationPairSolver::new(group, solver).map_err(|e| {
                ConfigError::InvalidParameter {
                    name: "solver",
                    reason: e.to_string(),
                }
            })?;
            Pairer::Solver {
                solver,
                target: angle_degrees.to_radians(),
            }
        }
    };

    reporter.report(Progress::TaskStart {
        total_steps: grains.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = grains.iter_mut();

    #[cfg(feature = "parallel")]
    let iterator = grains.par_iter_mut();

    iterator.try_for_each(|grain| {
        pairer.assign(grain, seed)?;
        reporter.report(Progress::TaskIncrement);
        Ok::<(), EngineError>(())
    })?;

    reporter.report(Progress::TaskFinish);

    let approximate = grains
        .iter()
        .filter(|g| g.pair_quality.is_some_and(|q| q.is_approximate()))
        .count();
    if approximate > 0 {
        warn!(
            approximate,
            "Some orientation pairs did not reach the requested misorientation."
        );
    }
    info!(grains = grains.len(), "Orientation assignment complete.");
    Ok(approximate)
}
