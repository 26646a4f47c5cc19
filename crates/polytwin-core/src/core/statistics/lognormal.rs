use super::params::LognormalParams;
use super::{OUTPUT_DECIMALS, round_to_decimals};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const DEFAULT_POOL_SIZE: usize = 1000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    #[error(
        "Lognormal pool (mu = {mu}, sigma = {sigma}) is empty after filtering to [{min}, {max}]; widen the bounds"
    )]
    SamplingExhaustion {
        mu: f64,
        sigma: f64,
        min: f64,
        max: f64,
    },
    #[error("Invalid lognormal parameters: {0}")]
    InvalidParameters(String),
    #[error("Cannot normalize {count} samples whose sum is {sum}")]
    DegenerateSum { count: usize, sum: f64 },
}

/// A lognormal distribution truncated to `[min, max]`.
///
/// A fixed-size pool is drawn once at construction and filtered to the bounds; every
/// sample is then a uniform pick from that pool. The pool is shared read-only between
/// [`fork`](Self::fork)s while each instance owns its random state, so independent
/// workers never contend for a generator.
#[derive(Debug, Clone)]
pub struct BoundedLognormal {
    params: LognormalParams,
    pool: Arc<[f64]>,
    rng: StdRng,
}

impl BoundedLognormal {
    pub fn new(params: LognormalParams, pool_size: usize, seed: u64) -> Result<Self, SamplingError> {
        Self::with_rng(params, pool_size, StdRng::seed_from_u64(seed))
    }

    #[instrument(level = "debug", skip_all, fields(mu = params.mu, sigma = params.sigma))]
    pub fn with_rng(
        params: LognormalParams,
        pool_size: usize,
        mut rng: StdRng,
    ) -> Result<Self, SamplingError> {
        if !params.min.is_finite() || !params.max.is_finite() || params.min > params.max {
            return Err(SamplingError::InvalidParameters(format!(
                "bounds [{}, {}] are not a finite, ordered interval",
                params.min, params.max
            )));
        }
        if !(params.mu.is_finite() && params.sigma.is_finite() && params.sigma >= 0.0) {
            return Err(SamplingError::InvalidParameters(format!(
                "mu must be finite and sigma finite and non-negative, got mu = {}, sigma = {}",
                params.mu, params.sigma
            )));
        }
        let distribution = LogNormal::new(params.mu, params.sigma)
            .map_err(|e| SamplingError::InvalidParameters(e.to_string()))?;

        let pool: Vec<f64> = (0..pool_size)
            .map(|_| distribution.sample(&mut rng))
            .filter(|value| params.contains(*value))
            .collect();

        debug!(
            requested = pool_size,
            retained = pool.len(),
            "Drew bounded lognormal pool."
        );
        if pool.is_empty() {
            warn!(
                min = params.min,
                max = params.max,
                "No lognormal draws fell inside the bounds; sampling from this distribution will fail."
            );
        }

        Ok(Self {
            params,
            pool: pool.into(),
            rng,
        })
    }

    /// A sampler over the same pool with its own, freshly seeded random state.
    pub fn fork(&self, seed: u64) -> Self {
        Self {
            params: self.params,
            pool: Arc::clone(&self.pool),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn params(&self) -> &LognormalParams {
        &self.params
    }

    pub fn pool(&self) -> &[f64] {
        &self.pool
    }

    pub fn is_exhausted(&self) -> bool {
        self.pool.is_empty()
    }

    /// Picks one value from the pool, rounded to five decimals.
    pub fn sample(&mut self) -> Result<f64, SamplingError> {
        if self.pool.is_empty() {
            return Err(SamplingError::SamplingExhaustion {
                mu: self.params.mu,
                sigma: self.params.sigma,
                min: self.params.min,
                max: self.params.max,
            });
        }
        let value = self.pool[self.rng.gen_range(0..self.pool.len())];
        Ok(round_to_decimals(value, OUTPUT_DECIMALS).clamp(self.params.min, self.params.max))
    }

    pub fn sample_many(&mut self, n: usize) -> Result<Vec<f64>, SamplingError> {
        (0..n).map(|_| self.sample()).collect()
    }

    /// Draws `n` values and rescales them so they sum to `target_sum`.
    ///
    /// Rescaled values are not re-rounded and may leave `[min, max]`; only their sum is
    /// constrained.
    pub fn sample_normalized(
        &mut self,
        n: usize,
        target_sum: f64,
    ) -> Result<Vec<f64>, SamplingError> {
        let values = self.sample_many(n)?;
        if values.is_empty() {
            return Ok(values);
        }
        let sum: f64 = values.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(SamplingError::DegenerateSum { count: n, sum });
        }
        let scale = target_sum / sum;
        Ok(values.into_iter().map(|v| v * scale).collect())
    }
}
