use crate::cli::MisorientationArgs;
use crate::error::{CliError, Result};
use crate::utils::parser::parse_orientation;
use polytwin::core::orientation::{
    Orientation, SymmetryRegistry,
    misorientation::{Misorientation, disorientation, misorientation_angles},
};
use tracing::{debug, info};

/// The disorientation between two orientations and, optionally, every per-operator angle.
#[derive(Debug, Clone, PartialEq)]
pub struct MisorientationReport {
    pub disorientation: Misorientation,
    pub operator_angles: Option<Vec<f64>>,
}

pub fn run(args: MisorientationArgs) -> Result<()> {
    let report = compute(&args)?;
    let d = &report.disorientation;

    println!("Disorientation: {:.5}°", d.angle_degrees());
    println!(
        "Axis: [{:.5}, {:.5}, {:.5}] (operator #{})",
        d.axis.x, d.axis.y, d.axis.z, d.operator_index
    );
    if let Some(angles) = &report.operator_angles {
        println!("Per-operator angles:");
        for (i, angle) in angles.iter().enumerate() {
            println!("  {:>3}  {:.5}°", i, angle.to_degrees());
        }
    }
    Ok(())
}

pub fn compute(args: &MisorientationArgs) -> Result<MisorientationReport> {
    let from = parse(&args.from)?;
    let to = parse(&args.to)?;
    let registry = SymmetryRegistry::standard();
    let group = registry
        .lookup(&args.crystal_family)
        .map_err(|e| CliError::Argument(e.to_string()))?;
    info!(%from, %to, family = %group.family(), "Computing disorientation.");

    let disorientation = disorientation(&from, &to, group);
    debug!(?disorientation, "Disorientation computed.");
    let operator_angles = args.all.then(|| misorientation_angles(&from, &to, group));

    Ok(MisorientationReport {
        disorientation,
        operator_angles,
    })
}

fn parse(input: &str) -> Result<Orientation> {
    parse_orientation(input).map_err(|e| CliError::Argument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(from: &str, to: &str, family: &str, all: bool) -> MisorientationArgs {
        MisorientationArgs {
            from: from.to_string(),
            to: to.to_string(),
            crystal_family: family.to_string(),
            all,
        }
    }

    #[test]
    fn identical_orientations_have_zero_disorientation() {
        let report = compute(&args("10,20,30", "10,20,30", "cubic", false)).unwrap();
        assert!(report.disorientation.angle.abs() < 1e-6);
        assert!(report.operator_angles.is_none());
    }

    #[test]
    fn cubic_symmetry_folds_a_ninety_degree_rotation_to_zero() {
        let report = compute(&args("0,0,0", "90,0,0", "cubic", true)).unwrap();
        assert!(report.disorientation.angle.abs() < 1e-6);
        assert_eq!(report.operator_angles.unwrap().len(), 24);

        let triclinic = compute(&args("0,0,0", "90,0,0", "triclinic", false)).unwrap();
        assert!((triclinic.disorientation.angle_degrees() - 90.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_family_and_bad_orientations_are_argument_errors() {
        assert!(matches!(
            compute(&args("0,0,0", "1,2,3", "tetragonal", false)),
            Err(CliError::Argument(msg)) if msg.contains("tetragonal")
        ));
        assert!(matches!(
            compute(&args("0,0", "1,2,3", "cubic", false)),
            Err(CliError::Argument(_))
        ));
    }
}
