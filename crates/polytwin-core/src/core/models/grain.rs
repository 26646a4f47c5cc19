use crate::core::io::format_real;
use crate::core::orientation::Orientation;
use itertools::Itertools;
use std::fmt;

/// The layering of one grain along its twinning direction.
///
/// A twinned grain alternates `gap_i, width_i` segments: `gap_i` is parent material
/// and `width_i` the thickness of the `i`-th twin lamella. An untwinned grain has a
/// single gap spanning the domain reference length and no widths.
#[derive(Debug, Clone, PartialEq)]
pub struct TwinLamellaSequence {
    gaps: Vec<f64>,
    widths: Vec<f64>,
}

impl TwinLamellaSequence {
    pub fn untwinned(domain_length: f64) -> Self {
        Self {
            gaps: vec![domain_length],
            widths: Vec::new(),
        }
    }

    /// # Panics
    ///
    /// Panics if `gaps` and `widths` differ in length or are empty.
    pub fn twinned(gaps: Vec<f64>, widths: Vec<f64>) -> Self {
        assert_eq!(
            gaps.len(),
            widths.len(),
            "every twin lamella needs a preceding gap"
        );
        assert!(!widths.is_empty(), "a twinned grain needs at least one lamella");
        Self { gaps, widths }
    }

    pub fn gaps(&self) -> &[f64] {
        &self.gaps
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn twin_count(&self) -> usize {
        self.widths.len()
    }

    pub fn is_twinned(&self) -> bool {
        !self.widths.is_empty()
    }

    pub fn gap_total(&self) -> f64 {
        self.gaps.iter().sum()
    }

    /// Gaps and widths interleaved in physical order.
    pub fn fields(&self) -> Vec<f64> {
        self.gaps
            .iter()
            .interleave(self.widths.iter())
            .copied()
            .collect()
    }
}

impl fmt::Display for TwinLamellaSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.fields().into_iter().map(format_real).join(":");
        f.write_str(&joined)
    }
}

/// How the twin orientation of a grain was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairQuality {
    /// Closed-form CSL construction.
    Exact,
    /// Solver met its tolerance; `residual` is the remaining angular error (radians).
    Converged { residual: f64 },
    /// Solver ran out of iterations; the best candidate found is used.
    Approximate { residual: f64 },
}

impl PairQuality {
    pub fn is_approximate(&self) -> bool {
        matches!(self, PairQuality::Approximate { .. })
    }
}

/// One grain of the first-pass tessellation, populated incrementally by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GrainRecord {
    /// 1-based id, matching the tessellator's grain ordering.
    pub id: usize,
    pub diameter: f64,
    pub sphericity: f64,
    pub lamellae: Option<TwinLamellaSequence>,
    pub parent_orientation: Option<Orientation>,
    pub twin_orientation: Option<Orientation>,
    pub pair_quality: Option<PairQuality>,
}

impl GrainRecord {
    pub fn new(id: usize, diameter: f64, sphericity: f64) -> Self {
        Self {
            id,
            diameter,
            sphericity,
            lamellae: None,
            parent_orientation: None,
            twin_orientation: None,
            pair_quality: None,
        }
    }

    pub fn eq_radius(&self) -> f64 {
        self.diameter / 2.0
    }

    pub fn twin_count(&self) -> usize {
        self.lamellae
            .as_ref()
            .map_or(0, TwinLamellaSequence::twin_count)
    }

    pub fn orientation_pair(&self) -> Option<(Orientation, Orientation)> {
        self.parent_orientation.zip(self.twin_orientation)
    }
}
