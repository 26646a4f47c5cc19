use itertools::Itertools;
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SymmetryError {
    #[error("Unsupported crystal family: '{0}'")]
    UnsupportedCrystalFamily(String),
}

/// Crystal families with a registered set of proper rotation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrystalFamily {
    #[default]
    Cubic,
    Hexagonal,
    /// No rotational symmetry beyond the identity.
    Triclinic,
}

impl CrystalFamily {
    pub fn name(&self) -> &'static str {
        match self {
            CrystalFamily::Cubic => "cubic",
            CrystalFamily::Hexagonal => "hexagonal",
            CrystalFamily::Triclinic => "triclinic",
        }
    }
}

impl fmt::Display for CrystalFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CrystalFamily {
    type Err = SymmetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cubic" => Ok(CrystalFamily::Cubic),
            "hexagonal" | "hcp" => Ok(CrystalFamily::Hexagonal),
            "triclinic" | "none" => Ok(CrystalFamily::Triclinic),
            _ => Err(SymmetryError::UnsupportedCrystalFamily(s.to_string())),
        }
    }
}

/// An ordered set of proper rotations leaving a crystal lattice invariant.
///
/// The identity is always the first operator.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryGroup {
    family: CrystalFamily,
    operators: Vec<Matrix3<f64>>,
}

impl SymmetryGroup {
    pub fn new(family: CrystalFamily, mut operators: Vec<Matrix3<f64>>) -> Self {
        let identity = Matrix3::identity();
        match operators
            .iter()
            .position(|op| (op - identity).abs().max() < 1e-12)
        {
            Some(0) => {}
            Some(idx) => {
                let op = operators.remove(idx);
                operators.insert(0, op);
            }
            None => operators.insert(0, identity),
        }
        Self { family, operators }
    }

    pub fn identity() -> Self {
        Self::new(CrystalFamily::Triclinic, vec![Matrix3::identity()])
    }

    /// The 24 proper rotations of the cubic point group (432).
    ///
    /// These are exactly the signed permutation matrices with determinant +1.
    pub fn cubic() -> Self {
        let operators = (0..3usize)
            .permutations(3)
            .cartesian_product(0..8u8)
            .filter_map(|(perm, signs)| {
                let mut m = Matrix3::zeros();
                for (row, &col) in perm.iter().enumerate() {
                    m[(row, col)] = if signs >> row & 1 == 1 { -1.0 } else { 1.0 };
                }
                (m.determinant() > 0.0).then_some(m)
            })
            .collect();
        Self::new(CrystalFamily::Cubic, operators)
    }

    /// The 12 proper rotations of the hexagonal point group (622), c-axis along z.
    pub fn hexagonal() -> Self {
        let about_c = (0..6).map(|k| {
            Rotation3::from_axis_angle(&Vector3::z_axis(), k as f64 * PI / 3.0).into_inner()
        });
        let diads = (0..6).map(|k| {
            let theta = k as f64 * PI / 6.0;
            let axis = Unit::new_normalize(Vector3::new(theta.cos(), theta.sin(), 0.0));
            Rotation3::from_axis_angle(&axis, PI).into_inner()
        });
        Self::new(CrystalFamily::Hexagonal, about_c.chain(diads).collect())
    }

    pub fn family(&self) -> CrystalFamily {
        self.family
    }

    pub fn operators(&self) -> &[Matrix3<f64>] {
        &self.operators
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

/// Maps each crystal family to its symmetry group.
#[derive(Debug, Clone)]
pub struct SymmetryRegistry {
    groups: HashMap<CrystalFamily, SymmetryGroup>,
}

impl SymmetryRegistry {
    pub fn empty() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(SymmetryGroup::cubic());
        registry.register(SymmetryGroup::hexagonal());
        registry.register(SymmetryGroup::identity());
        registry
    }

    /// Registers a group under its family, returning the group it replaced.
    pub fn register(&mut self, group: SymmetryGroup) -> Option<SymmetryGroup> {
        self.groups.insert(group.family(), group)
    }

    pub fn get(&self, family: CrystalFamily) -> Result<&SymmetryGroup, SymmetryError> {
        self.groups
            .get(&family)
            .ok_or_else(|| SymmetryError::UnsupportedCrystalFamily(family.to_string()))
    }

    pub fn lookup(&self, tag: &str) -> Result<&SymmetryGroup, SymmetryError> {
        self.get(tag.parse()?)
    }
}

impl Default for SymmetryRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
