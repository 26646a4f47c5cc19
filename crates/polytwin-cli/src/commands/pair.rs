use crate::cli::PairArgs;
use crate::error::{CliError, Result};
use crate::utils::parser::parse_orientation;
use polytwin::core::models::PairQuality;
use polytwin::core::orientation::{
    Orientation, SymmetryRegistry, csl::csl_pair, misorientation::misorientation,
};
use polytwin::engine::config::SolverConfig;
use polytwin::engine::pairing::OrientationPairSolver;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct PairReport {
    pub parent: Orientation,
    pub twin: Orientation,
    /// Disorientation between the two, in degrees.
    pub achieved_degrees: f64,
    pub quality: PairQuality,
}

pub fn run(args: PairArgs) -> Result<()> {
    let report = compute(&args)?;
    println!("{}", report.parent);
    println!("{}", report.twin);
    match report.quality {
        PairQuality::Approximate { residual } => {
            warn!(residual, "Solver did not reach the requested tolerance.");
            println!(
                "Disorientation: {:.5}° (approximate, residual {:.5}°)",
                report.achieved_degrees,
                residual.to_degrees()
            );
        }
        _ => println!("Disorientation: {:.5}°", report.achieved_degrees),
    }
    Ok(())
}

pub fn compute(args: &PairArgs) -> Result<PairReport> {
    let reference = args
        .reference
        .as_deref()
        .map(parse_orientation)
        .transpose()
        .map_err(|e| CliError::Argument(e.to_string()))?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let registry = SymmetryRegistry::standard();
    let group = registry
        .lookup(&args.crystal_family)
        .map_err(|e| CliError::Argument(e.to_string()))?;

    let ([parent, twin], quality) = match (args.sigma, args.angle) {
        (Some(sigma), _) => {
            info!(sigma, "Building CSL pair.");
            let pair = csl_pair(sigma, reference, &mut rng)
                .map_err(|e| CliError::Argument(e.to_string()))?;
            (pair, PairQuality::Exact)
        }
        (None, Some(angle)) => {
            let defaults = SolverConfig::default();
            let settings = SolverConfig {
                tolerance: args
                    .tolerance
                    .map_or(defaults.tolerance, f64::to_radians),
                max_iterations: args.max_iterations.unwrap_or(defaults.max_iterations),
            };
            info!(angle, family = %group.family(), "Solving orientation pair.");
            let solver = OrientationPairSolver::new(group, settings)
                .map_err(|e| CliError::Argument(e.to_string()))?;
            let (pair, outcome) = solver
                .solve_pair(reference, angle.to_radians(), &mut rng)
                .map_err(|e| CliError::Argument(e.to_string()))?;
            (pair, outcome.quality())
        }
        (None, None) => {
            return Err(CliError::Argument(
                "either --sigma or --angle is required".to_string(),
            ));
        }
    };

    Ok(PairReport {
        parent,
        twin,
        achieved_degrees: misorientation(&parent, &twin, group).to_degrees(),
        quality,
    })
}
