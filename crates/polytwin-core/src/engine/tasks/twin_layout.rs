use crate::core::models::{GrainRecord, TwinLamellaSequence};
use crate::core::statistics::BoundedLognormal;
use crate::engine::config::TwinLayoutConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::utils::rng::{LAYOUT_STREAM, derive_seed};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of twins for a grain, scaled linearly with its diameter.
///
/// The largest grain receives `max_expected_twins`; halfway values round to even.
pub fn expected_twin_count(diameter: f64, max_diameter: f64, max_expected_twins: usize) -> usize {
    if !(max_diameter > 0.0) {
        return 0;
    }
    let expected = (max_expected_twins as f64 * diameter / max_diameter).round_ties_even();
    if expected > 0.0 { expected as usize } else { 0 }
}

fn layout_grain(
    grain: &GrainRecord,
    is_reference: bool,
    max_diameter: f64,
    sampler: &BoundedLognormal,
    config: &TwinLayoutConfig,
    seed: u64,
) -> Result<TwinLamellaSequence, EngineError> {
    let count = expected_twin_count(grain.diameter, max_diameter, config.max_expected_twins);
    if is_reference || count == 0 {
        return Ok(TwinLamellaSequence::untwinned(config.domain_length));
    }

    let mut sampler = sampler.fork(derive_seed(seed, LAYOUT_STREAM, grain.id as u64));
    let sampling_error = |source| EngineError::Sampling {
        grain_id: grain.id,
        source,
    };
    let widths = sampler.sample_many(count).map_err(sampling_error)?;
    let budget = config.gap_policy.gap_budget(grain.diameter, grain.sphericity);
    let gaps = sampler
        .sample_normalized(count, budget)
        .map_err(sampling_error)?;

    Ok(TwinLamellaSequence::twinned(gaps, widths))
}

/// Assigns a lamella sequence to every grain and returns the total number of twins.
///
/// The first grain is the reference grain of the tessellation and never twins.
#[instrument(skip_all, name = "twin_layout_task")]
pub fn run(
    grains: &mut [GrainRecord],
    sampler: &BoundedLognormal,
    config: &TwinLayoutConfig,
    seed: u64,
    reporter: &ProgressReporter,
) -> Result<usize, EngineError> {
    let max_diameter = grains.iter().map(|g| g.diameter).fold(0.0, f64::max);
    info!(
        grains = grains.len(),
        max_diameter,
        max_expected_twins = config.max_expected_twins,
        "Laying out twin lamellae."
    );

    reporter.report(Progress::TaskStart {
        total_steps: grains.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = grains.iter_mut().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = grains.par_iter_mut().enumerate();

    iterator.try_for_each(|(index, grain)| {
        let lamellae = layout_grain(grain, index == 0, max_diameter, sampler, config, seed)?;
        grain.lamellae = Some(lamellae);
        reporter.report(Progress::TaskIncrement);
        Ok::<(), EngineError>(())
    })?;

    reporter.report(Progress::TaskFinish);

    let total_twins = grains.iter().map(GrainRecord::twin_count).sum();
    info!(total_twins, "Twin layout complete.");
    Ok(total_twins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::lamellae::{LamellaEntry, TwinWidthFile};
    use crate::core::io::traits::TessellatorFile;
    use crate::core::statistics::LognormalParams;
    use crate::engine::config::GapPolicy;

    fn sampler() -> BoundedLognormal {
        BoundedLognormal::new(LognormalParams::new(1.45213, 0.87586, 0.6042, 59.8839), 1000, 3).unwrap()
    }

    fn layout(max_expected_twins: usize) -> TwinLayoutConfig {
        TwinLayoutConfig {
            max_expected_twins,
            domain_length: 500.0,
            gap_policy: GapPolicy::Diameter,
        }
    }

    #[test]
    fn expected_count_scales_with_diameter_and_rounds_half_to_even() {
        assert_eq!(expected_twin_count(100.0, 100.0, 5), 5);
        assert_eq!(expected_twin_count(50.0, 100.0, 5), 2);
        assert_eq!(expected_twin_count(70.0, 100.0, 5), 4);
        assert_eq!(expected_twin_count(30.0, 100.0, 5), 2);
        assert_eq!(expected_twin_count(5.0, 100.0, 5), 0);
        assert_eq!(expected_twin_count(10.0, 0.0, 5), 0);
    }

    #[test]
    fn reference_grain_stays_untwinned_and_largest_gets_full_count() {
        let mut grains = vec![GrainRecord::new(1, 50.0, 0.9), GrainRecord::new(2, 100.0, 0.9)];

        let total = run(&mut grains, &sampler(), &layout(5), 7, &ProgressReporter::new()).unwrap();

        assert_eq!(total, 5);
        assert_eq!(grains[0].twin_count(), 0);

        let lamellae = grains[1].lamellae.as_ref().unwrap();
        assert_eq!(lamellae.fields().len(), 10);
        assert!((lamellae.gap_total() - 100.0).abs() < 1e-6);
        for width in lamellae.widths() {
            assert!((0.6042..=59.8839).contains(width));
        }

        let entries = TwinWidthFile::entries(&grains).unwrap();
        let mut buffer = Vec::new();
        TwinWidthFile::write_to(&entries[..1], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "1 500\n");
    }

    #[test]
    fn written_lines_carry_twice_the_twin_count_in_fields() {
        let mut grains = vec![
            GrainRecord::new(1, 80.0, 0.9),
            GrainRecord::new(2, 100.0, 0.8),
            GrainRecord::new(3, 61.0, 0.85),
        ];
        run(&mut grains, &sampler(), &layout(10), 1, &ProgressReporter::new()).unwrap();

        let entries: Vec<LamellaEntry> = TwinWidthFile::entries(&grains).unwrap();
        let mut buffer = Vec::new();
        TwinWidthFile::write_to(&entries, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "1 500");
        assert_eq!(lines[1].split_once(' ').unwrap().1.split(':').count(), 20);
        assert_eq!(lines[2].split_once(' ').unwrap().1.split(':').count(), 12);
    }

    #[test]
    fn sphericity_scaled_policy_lengthens_the_gap_budget() {
        let mut grains = vec![GrainRecord::new(1, 10.0, 1.0), GrainRecord::new(2, 100.0, 0.8)];
        let config = TwinLayoutConfig {
            gap_policy: GapPolicy::SphericityScaled,
            ..layout(3)
        };

        run(&mut grains, &sampler(), &config, 9, &ProgressReporter::new()).unwrap();

        let total = grains[1].lamellae.as_ref().unwrap().gap_total();
        assert!((total - 125.0).abs() < 1e-6);
    }

    #[test]
    fn layout_is_reproducible_for_a_fixed_seed() {
        let make = || vec![GrainRecord::new(1, 40.0, 0.9), GrainRecord::new(2, 90.0, 0.9), GrainRecord::new(3, 70.0, 0.9)];
        let mut a = make();
        let mut b = make();

        run(&mut a, &sampler(), &layout(6), 21, &ProgressReporter::new()).unwrap();
        run(&mut b, &sampler(), &layout(6), 21, &ProgressReporter::new()).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn exhausted_sampler_reports_the_failing_grain() {
        let empty = BoundedLognormal::new(LognormalParams::new(0.0, 0.1, 100.0, 200.0), 100, 1).unwrap();
        let mut grains = vec![GrainRecord::new(1, 50.0, 0.9), GrainRecord::new(2, 100.0, 0.9)];

        let err = run(&mut grains, &empty, &layout(4), 0, &ProgressReporter::new()).unwrap_err();

        assert!(matches!(err, EngineError::Sampling { grain_id: 2, .. }));
    }
}
