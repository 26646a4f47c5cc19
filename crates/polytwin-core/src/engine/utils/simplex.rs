use nalgebra::SVector;
use std::cmp::Ordering;
use tracing::trace;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Outcome of a Nelder-Mead minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexResult<const N: usize> {
    pub point: [f64; N],
    pub value: f64,
    /// Simplex iterations spent, restarts included.
    pub iterations: usize,
    pub restarts: usize,
    /// Whether `value` reached the target before the iteration budget ran out.
    pub converged: bool,
}

/// Derivative-free Nelder-Mead minimizer with restarts on simplex collapse.
///
/// The search stops as soon as the best vertex scores at or below `target`, or when
/// `max_iterations` is exhausted. A simplex that degenerates to a point without meeting
/// the target is rebuilt around its best vertex with the initial step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMead {
    pub initial_step: f64,
    pub max_iterations: usize,
    pub target: f64,
    pub collapse_tolerance: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            initial_step: 0.5,
            max_iterations: 2000,
            target: 0.0,
            collapse_tolerance: 1e-12,
        }
    }
}

type Vertex<const N: usize> = (SVector<f64, N>, f64);

fn by_value<const N: usize>(a: &Vertex<N>, b: &Vertex<N>) -> Ordering {
    a.1.total_cmp(&b.1)
}

impl NelderMead {
    pub fn new(max_iterations: usize, target: f64) -> Self {
        Self {
            max_iterations,
            target,
            ..Self::default()
        }
    }

    fn build_simplex<const N: usize, F>(&self, origin: SVector<f64, N>, f: &mut F) -> Vec<Vertex<N>>
    where
        F: FnMut(&[f64; N]) -> f64,
    {
        let mut simplex = Vec::with_capacity(N + 1);
        simplex.push((origin, f(&origin.into())));
        for axis in 0..N {
            let mut vertex = origin;
            vertex[axis] += self.initial_step;
            simplex.push((vertex, f(&vertex.into())));
        }
        simplex
    }

    fn has_collapsed<const N: usize>(&self, simplex: &[Vertex<N>]) -> bool {
        let (best, best_value) = simplex[0];
        simplex[1..].iter().all(|(x, value)| {
            (x - best).amax() <= self.collapse_tolerance
                && (value - best_value).abs() <= self.collapse_tolerance
        })
    }

    pub fn minimize<const N: usize, F>(&self, mut f: F, start: [f64; N]) -> SimplexResult<N>
    where
        F: FnMut(&[f64; N]) -> f64,
    {
        let mut simplex = self.build_simplex(SVector::from(start), &mut f);
        let mut iterations = 0;
        let mut restarts = 0;

        loop {
            simplex.sort_by(by_value);
            let (best, best_value) = simplex[0];

            if best_value <= self.target || iterations >= self.max_iterations {
                return SimplexResult {
                    point: best.into(),
                    value: best_value,
                    iterations,
                    restarts,
                    converged: best_value <= self.target,
                };
            }
            iterations += 1;

            if self.has_collapsed(&simplex) {
                restarts += 1;
                trace!(iterations, value = best_value, "Simplex collapsed; restarting.");
                simplex = self.build_simplex(best, &mut f);
                continue;
            }

            let worst = N;
            let (worst_point, worst_value) = simplex[worst];
            let second_worst_value = simplex[worst - 1].1;
            let centroid = simplex[..worst]
                .iter()
                .fold(SVector::<f64, N>::zeros(), |acc, (x, _)| acc + x)
                / N as f64;

            let reflected = centroid + (centroid - worst_point) * REFLECTION;
            let reflected_value = f(&reflected.into());

            if reflected_value < best_value {
                let expanded = centroid + (reflected - centroid) * EXPANSION;
                let expanded_value = f(&expanded.into());
                simplex[worst] = if expanded_value < reflected_value {
                    (expanded, expanded_value)
                } else {
                    (reflected, reflected_value)
                };
                continue;
            }

            if reflected_value < second_worst_value {
                simplex[worst] = (reflected, reflected_value);
                continue;
            }

            let (contracted, bound) = if reflected_value < worst_value {
                (centroid + (reflected - centroid) * CONTRACTION, reflected_value)
            } else {
                (centroid + (worst_point - centroid) * CONTRACTION, worst_value)
            };
            let contracted_value = f(&contracted.into());
            if contracted_value < bound {
                simplex[worst] = (contracted, contracted_value);
                continue;
            }

            for vertex in simplex.iter_mut().skip(1) {
                let shrunk = best + (vertex.0 - best) * SHRINK;
                *vertex = (shrunk, f(&shrunk.into()));
            }
        }
    }
}
