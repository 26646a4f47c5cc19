use super::euler::Orientation;
use super::symmetry::SymmetryGroup;
use nalgebra::{Matrix3, Vector3};

/// The minimal misorientation (disorientation) between two orientations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Misorientation {
    /// Rotation angle in radians, within `[0, π]`.
    pub angle: f64,
    /// Index of the symmetry operator that produced the minimum.
    pub operator_index: usize,
    /// Unit rotation axis of the minimizing misorientation matrix (zero when `angle` is zero).
    pub axis: Vector3<f64>,
}

impl Misorientation {
    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }
}

/// Rotation angle of a proper rotation matrix, `acos((trace - 1) / 2)` with the argument clamped.
#[inline]
pub fn rotation_angle(matrix: &Matrix3<f64>) -> f64 {
    ((matrix.trace() - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
}

fn rotation_axis(matrix: &Matrix3<f64>) -> Vector3<f64> {
    let axis = Vector3::new(
        matrix[(2, 1)] - matrix[(1, 2)],
        matrix[(0, 2)] - matrix[(2, 0)],
        matrix[(1, 0)] - matrix[(0, 1)],
    );
    let norm = axis.norm();
    if norm < 1e-12 {
        Vector3::zeros()
    } else {
        axis / norm
    }
}

/// The symmetry-equivalent descriptions of one orientation, precomputed once.
///
/// Stores `(S · M)^T` for every operator `S`, which is all that is needed to compare the
/// orientation against many candidates (as the pair solver does on every evaluation).
#[derive(Debug, Clone)]
pub struct SymmetricEquivalents {
    inverted: Vec<Matrix3<f64>>,
}

impl SymmetricEquivalents {
    pub fn new(orientation: &Orientation, group: &SymmetryGroup) -> Self {
        Self::from_matrix(&orientation.matrix(), group)
    }

    pub fn from_matrix(matrix: &Matrix3<f64>, group: &SymmetryGroup) -> Self {
        let inverted = group
            .operators()
            .iter()
            .map(|sym| (sym * matrix).transpose())
            .collect();
        Self { inverted }
    }

    /// Angles to `other` for every operator, in operator order. The matrix is copied, so the
    /// iterator only borrows `self`.
    pub fn angles_to<'a>(&'a self, other: &Matrix3<f64>) -> impl Iterator<Item = f64> + use<'a> {
        let other = *other;
        self.inverted
            .iter()
            .map(move |inv| rotation_angle(&(inv * other)))
    }

    pub fn misorientation_to(&self, other: &Matrix3<f64>) -> f64 {
        self.angles_to(other).fold(f64::INFINITY, f64::min)
    }

    pub fn disorientation_to(&self, other: &Matrix3<f64>) -> Misorientation {
        let mut best = Misorientation {
            angle: f64::INFINITY,
            operator_index: 0,
            axis: Vector3::zeros(),
        };
        for (idx, inv) in self.inverted.iter().enumerate() {
            let delta = inv * other;
            let angle = rotation_angle(&delta);
            if angle < best.angle {
                best = Misorientation {
                    angle,
                    operator_index: idx,
                    axis: rotation_axis(&delta),
                };
            }
        }
        best
    }
}

/// Rotation angles (radians) between `a` and `b` for every operator of `group`, in operator order.
pub fn misorientation_angles(a: &Orientation, b: &Orientation, group: &SymmetryGroup) -> Vec<f64> {
    SymmetricEquivalents::new(a, group)
        .angles_to(&b.matrix())
        .collect()
}

/// Minimal rotation angle (radians) relating `a` to `b` under the crystal symmetry of `group`.
pub fn misorientation(a: &Orientation, b: &Orientation, group: &SymmetryGroup) -> f64 {
    SymmetricEquivalents::new(a, group).misorientation_to(&b.matrix())
}

pub fn disorientation(a: &Orientation, b: &Orientation, group: &SymmetryGroup) -> Misorientation {
    SymmetricEquivalents::new(a, group).disorientation_to(&b.matrix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::orientation::euler::random_orientation;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-7;

    #[test]
    fn misorientation_of_an_orientation_with_itself_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let cubic = SymmetryGroup::cubic();
        for _ in 0..100 {
            let ori = random_orientation(&mut rng);
            assert!(misorientation(&ori, &ori, &cubic) < 1e-6);
        }
    }

    #[test]
    fn misorientation_is_symmetric_and_bounded() {
        let mut rng = StdRng::seed_from_u64(2);
        for group in [SymmetryGroup::cubic(), SymmetryGroup::identity()] {
            for _ in 0..200 {
                let a = random_orientation(&mut rng);
                let b = random_orientation(&mut rng);
                let ab = misorientation(&a, &b, &group);
                let ba = misorientation(&b, &a, &group);
                assert!((ab - ba).abs() < TOLERANCE);
                assert!((0.0..=PI).contains(&ab));
            }
        }
    }

    #[test]
    fn cubic_disorientation_never_exceeds_the_fundamental_zone_limit() {
        let mut rng = StdRng::seed_from_u64(3);
        let cubic = SymmetryGroup::cubic();
        let limit = 62.8_f64.to_radians();
        for _ in 0..500 {
            let a = random_orientation(&mut rng);
            let b = random_orientation(&mut rng);
            assert!(misorientation(&a, &b, &cubic) <= limit);
        }
    }

    #[test]
    fn misorientation_is_invariant_under_symmetry_relabeling() {
        let mut rng = StdRng::seed_from_u64(4);
        let cubic = SymmetryGroup::cubic();
        let a = random_orientation(&mut rng);
        let b = random_orientation(&mut rng);
        let reference = misorientation(&a, &b, &cubic);
        for sym in cubic.operators() {
            let relabeled = Orientation::from_matrix(&(sym * a.matrix()));
            assert!((misorientation(&relabeled, &b, &cubic) - reference).abs() < 1e-6);
        }
    }

    #[test]
    fn rotation_about_cube_axis_reduces_modulo_ninety_degrees() {
        let cubic = SymmetryGroup::cubic();
        let a = Orientation::identity();
        let b = Orientation::from_degrees(100.0, 0.0, 0.0);
        assert!((misorientation(&a, &b, &cubic).to_degrees() - 10.0).abs() < 1e-6);

        let no_symmetry = SymmetryGroup::identity();
        assert!((misorientation(&a, &b, &no_symmetry).to_degrees() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn misorientation_angles_lists_one_angle_per_operator() {
        let cubic = SymmetryGroup::cubic();
        let a = Orientation::from_degrees(10.0, 20.0, 30.0);
        let b = Orientation::from_degrees(40.0, 50.0, 60.0);
        let angles = misorientation_angles(&a, &b, &cubic);
        assert_eq!(angles.len(), 24);
        let min = angles.iter().cloned().fold(f64::INFINITY, f64::min);
        assert!((min - misorientation(&a, &b, &cubic)).abs() < 1e-12);
    }

    #[test]
    fn angles_iterator_does_not_borrow_the_candidate_matrix() {
        let cubic = SymmetryGroup::cubic();
        let equivalents = SymmetricEquivalents::new(&Orientation::identity(), &cubic);
        let angles = {
            let candidate = Orientation::from_degrees(90.0, 0.0, 0.0).matrix();
            equivalents.angles_to(&candidate)
        };
        let angles: Vec<f64> = angles.collect();
        assert_eq!(angles.len(), 24);
        assert!(angles.iter().cloned().fold(f64::INFINITY, f64::min) < 1e-6);
    }

    #[test]
    fn disorientation_reports_axis_of_rotation() {
        let no_symmetry = SymmetryGroup::identity();
        let a = Orientation::identity();
        let b = Orientation::from_degrees(30.0, 0.0, 0.0);
        let result = disorientation(&a, &b, &no_symmetry);
        assert!((result.angle_degrees() - 30.0).abs() < 1e-6);
        assert_eq!(result.operator_index, 0);
        assert!((result.axis.z.abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disorientation_axis_is_zero_for_identical_orientations() {
        let ori = Orientation::from_degrees(12.0, 34.0, 56.0);
        let result = disorientation(&ori, &ori, &SymmetryGroup::cubic());
        assert!(result.angle < 1e-6);
        assert!(result.axis.norm() < 1e-6 || result.axis.norm() > 0.99);
    }
}
