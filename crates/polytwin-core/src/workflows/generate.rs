use crate::core::models::GrainRecord;
use crate::core::orientation::SymmetryRegistry;
use crate::core::statistics::BoundedLognormal;
use crate::engine::config::GenerationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks;
use crate::engine::utils::rng::{POOL_STREAM, derive_seed};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub grains: Vec<GrainRecord>,
    pub total_twins: usize,
    /// Grains whose orientation pair missed the solver tolerance.
    pub approximate_pairs: usize,
}

fn validate_grains(grains: &[GrainRecord]) -> Result<(), EngineError> {
    if grains.is_empty() {
        return Err(EngineError::InvalidInput(
            "no grains to generate descriptors for".to_string(),
        ));
    }
    if let Some(bad) = grains
        .iter()
        .find(|g| !(g.diameter.is_finite() && g.diameter > 0.0))
    {
        return Err(EngineError::InvalidInput(format!(
            "grain {} has non-positive diameter {}",
            bad.id, bad.diameter
        )));
    }
    if let Some(bad) = grains
        .iter()
        .find(|g| !(g.sphericity.is_finite() && g.sphericity > 0.0))
    {
        return Err(EngineError::InvalidInput(format!(
            "grain {} has non-positive sphericity {}",
            bad.id, bad.sphericity
        )));
    }
    Ok(())
}

/// Runs twin layout and orientation pairing over the first-pass grains.
///
/// The run is fully determined by `config.seed`: repeated runs produce identical records
/// whether or not grains are processed in parallel.
#[instrument(skip_all, name = "generate_workflow", fields(grains = grains.len(), seed = config.seed))]
pub fn run(
    grains: Vec<GrainRecord>,
    config: &GenerationConfig,
    reporter: &ProgressReporter,
) -> Result<GenerationResult, EngineError> {
    // === Phase 0: Preparation ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    validate_grains(&grains)?;
    config.validate()?;

    let sampler = BoundedLognormal::new(
        config.twin_thickness,
        config.pool_size,
        derive_seed(config.seed, POOL_STREAM, 0),
    )
    .map_err(|source| EngineError::SamplerInit { source })?;
    if sampler.is_exhausted() {
        reporter.report(Progress::Message(
            "Twin thickness pool is empty; any twinned grain will fail.".to_string(),
        ));
    }
    let registry = SymmetryRegistry::standard();
    let mut grains = grains;
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Twin lamella layout ===
    reporter.report(Progress::PhaseStart {
        name: "Twin Layout",
    });
    let total_twins = tasks::twin_layout::run(&mut grains, &sampler, &config.layout, config.seed, reporter)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Orientation pairs ===
    reporter.report(Progress::PhaseStart {
        name: "Orientation Pairs",
    });
    let approximate_pairs = tasks::orientation_assignment::run(
        &mut grains,
        &config.orientation,
        &registry,
        config.seed,
        reporter,
    )?;
    reporter.report(Progress::PhaseFinish);

    if approximate_pairs > 0 {
        reporter.report(Progress::Message(format!(
            "{approximate_pairs} orientation pair(s) are approximate."
        )));
    }

    info!(
        grains = grains.len(),
        total_twins, approximate_pairs, "Generation complete."
    );
    Ok(GenerationResult {
        grains,
        total_twins,
        approximate_pairs,
    })
}
