use nalgebra::{Matrix3, Quaternion, UnitQuaternion};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use tracing::trace;

const GIMBAL_LOCK_EPSILON: f64 = 1e-8;

/// A triple of Euler-Bunge angles `(phi_1, Phi, phi_2)` expressed in radians.
///
/// No range normalization is applied; this is the raw parameterization used by the
/// conversion routines and the pair solver. Use [`Orientation`] for the normalized,
/// degree-based form exchanged with the tessellator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub phi1: f64,
    pub big_phi: f64,
    pub phi2: f64,
}

impl EulerAngles {
    pub const fn new(phi1: f64, big_phi: f64, phi2: f64) -> Self {
        Self { phi1, big_phi, phi2 }
    }

    pub fn from_degrees(phi1: f64, big_phi: f64, phi2: f64) -> Self {
        Self::new(phi1.to_radians(), big_phi.to_radians(), phi2.to_radians())
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.phi1, self.big_phi, self.phi2]
    }

    pub fn to_degrees(&self) -> [f64; 3] {
        [
            self.phi1.to_degrees(),
            self.big_phi.to_degrees(),
            self.phi2.to_degrees(),
        ]
    }
}

impl From<[f64; 3]> for EulerAngles {
    fn from(angles: [f64; 3]) -> Self {
        Self::new(angles[0], angles[1], angles[2])
    }
}

/// A crystal orientation stored as Euler-Bunge angles in degrees, each wrapped into `[0, 360)`.
///
/// The orientation matrix derived from these angles is always a proper rotation
/// (orthonormal, determinant +1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    phi1: f64,
    big_phi: f64,
    phi2: f64,
}

impl Orientation {
    pub fn from_degrees(phi1: f64, big_phi: f64, phi2: f64) -> Self {
        Self {
            phi1: wrap_degrees(phi1),
            big_phi: wrap_degrees(big_phi),
            phi2: wrap_degrees(phi2),
        }
    }

    pub fn from_radians(angles: EulerAngles) -> Self {
        let [phi1, big_phi, phi2] = angles.to_degrees();
        Self::from_degrees(phi1, big_phi, phi2)
    }

    pub fn from_matrix(matrix: &Matrix3<f64>) -> Self {
        Self::from_radians(matrix_to_euler(matrix))
    }

    pub fn identity() -> Self {
        Self::from_degrees(0.0, 0.0, 0.0)
    }

    pub fn degrees(&self) -> [f64; 3] {
        [self.phi1, self.big_phi, self.phi2]
    }

    pub fn radians(&self) -> EulerAngles {
        EulerAngles::from_degrees(self.phi1, self.big_phi, self.phi2)
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        euler_to_matrix(&self.radians())
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.phi1, self.big_phi, self.phi2)
    }
}

fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Converts Euler angles (radians) to a unit quaternion using half-angle products.
///
/// The first angle acts as roll, the second as pitch and the third as yaw. Together with
/// [`quat_to_euler`] this forms an exact round trip for first/third angles in `(-π, π]`
/// and a middle angle in `(-π/2, π/2)`.
pub fn euler_to_quat(angles: &EulerAngles) -> UnitQuaternion<f64> {
    let (sr, cr) = (angles.phi1 * 0.5).sin_cos();
    let (sp, cp) = (angles.big_phi * 0.5).sin_cos();
    let (sy, cy) = (angles.phi2 * 0.5).sin_cos();

    let x = sr * cp * cy - cr * sp * sy;
    let y = cr * sp * cy + sr * cp * sy;
    let z = cr * cp * sy - sr * sp * cy;
    let w = cr * cp * cy + sr * sp * sy;

    UnitQuaternion::new_unchecked(Quaternion::new(w, x, y, z))
}

/// Converts a unit quaternion back to Euler angles (radians).
///
/// The pitch argument is clamped to `[-1, 1]` before `asin` to absorb floating point drift.
pub fn quat_to_euler(quat: &UnitQuaternion<f64>) -> EulerAngles {
    let (w, x, y, z) = (quat.w, quat.i, quat.j, quat.k);

    let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
    let pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
    let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

    EulerAngles::new(roll, pitch, yaw)
}

/// Builds the Bunge orientation matrix for a set of Euler angles (radians).
pub fn euler_to_matrix(angles: &EulerAngles) -> Matrix3<f64> {
    let (s1, c1) = angles.phi1.sin_cos();
    let (s, c) = angles.big_phi.sin_cos();
    let (s2, c2) = angles.phi2.sin_cos();

    Matrix3::new(
        c1 * c2 - s1 * s2 * c,
        s1 * c2 + c1 * s2 * c,
        s2 * s,
        -c1 * s2 - s1 * c2 * c,
        -s1 * s2 + c1 * c2 * c,
        c2 * s,
        s1 * s,
        -c1 * s,
        c,
    )
}

/// Recovers Euler-Bunge angles (radians) from an orientation matrix.
///
/// `Phi` comes from `acos(om[2][2])`; `phi_1` and `phi_2` come from the third row and
/// column divided by `sin(Phi)`, resolved with `atan2` so every quadrant round-trips.
/// When `sin(Phi)` vanishes (gimbal lock at `Phi = 0` or `Phi = π`) only the sum or
/// difference of `phi_1` and `phi_2` is defined, so `phi_2` is pinned to zero and the
/// whole in-plane rotation is carried by `phi_1`.
pub fn matrix_to_euler(om: &Matrix3<f64>) -> EulerAngles {
    let big_phi = om[(2, 2)].clamp(-1.0, 1.0).acos();
    let sin_phi = big_phi.sin();

    if sin_phi.abs() < GIMBAL_LOCK_EPSILON {
        trace!(
            big_phi,
            "Degenerate orientation matrix (gimbal lock); pinning phi_2 to zero."
        );
        let phi1 = om[(0, 1)].atan2(om[(0, 0)]);
        return EulerAngles::new(phi1, big_phi, 0.0);
    }

    let phi1 = (om[(2, 0)] / sin_phi).atan2(-om[(2, 1)] / sin_phi);
    let phi2 = (om[(0, 2)] / sin_phi).atan2(om[(1, 2)] / sin_phi);
    EulerAngles::new(phi1, big_phi, phi2)
}

/// Draws a unit quaternion uniformly over SO(3) using Shoemake's two-plane construction.
pub fn random_quaternion(rng: &mut impl Rng) -> UnitQuaternion<f64> {
    let u0: f64 = rng.r#gen();
    let u1: f64 = rng.r#gen();
    let u2: f64 = rng.r#gen();

    let (outer, inner) = ((1.0 - u0).sqrt(), u0.sqrt());
    let (s1, c1) = (2.0 * PI * u1).sin_cos();
    let (s2, c2) = (2.0 * PI * u2).sin_cos();

    let x = outer * s1;
    let y = outer * c1;
    let z = inner * s2;
    let w = inner * c2;

    UnitQuaternion::new_normalize(Quaternion::new(w, x, y, z))
}

/// Draws an orientation uniformly distributed over SO(3).
///
/// The quaternion is turned into its rotation matrix before extracting Bunge angles,
/// so uniformity is preserved (sampling the Euler-angle cube directly would not be).
pub fn random_orientation(rng: &mut impl Rng) -> Orientation {
    let quat = random_quaternion(rng);
    let matrix = quat.to_rotation_matrix().into_inner();
    Orientation::from_matrix(&matrix)
}
