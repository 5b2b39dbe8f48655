//! Deterministic sale generation for replay runs.
//!
//! RULE: The runner never calls a platform RNG. Every generated sale flows
//! from the single `--seed`, so two runs with the same seed and config
//! produce the same ladder history.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct SaleRng {
    inner: Pcg64Mcg,
}

impl SaleRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }

    /// A sale amount in whole cents, capped at `max`.
    pub fn sale_amount(&mut self, x_min: f64, alpha: f64, max: f64) -> f64 {
        let raw = self.pareto(x_min, alpha).min(max);
        (raw * 100.0).round() / 100.0
    }
}
