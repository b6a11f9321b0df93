// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Ticket Probability Estimator
//
// Probability that an arriving target driver is caught, given the mean gap
// between target drivers and the number of cops. One cop has a closed form;
// larger pools are estimated by Monte Carlo and memoized on a rounded key.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::arrivals;
use crate::config::EnforcementConfig;
use crate::cops::CopPool;
use crate::error::{PatrolError, Result};

pub const DEFAULT_SAMPLES: usize = 10_000;
pub const DEFAULT_CACHE_PRECISION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    scaled_gap: i64,
    cops: usize,
}

pub struct TicketProbabilityEstimator {
    ticket_minutes: f64,
    samples: usize,
    scale: f64,
    rng: ChaCha8Rng,
    cache: HashMap<CacheKey, f64>,
    simulations_run: u64,
}

impl TicketProbabilityEstimator {
    pub fn new(ticket_minutes: f64, samples: usize, cache_precision: u32, seed: u64) -> Result<Self> {
        if !(ticket_minutes.is_finite() && ticket_minutes > 0.0) {
            return Err(PatrolError::param(format!(
                "ticket time must be positive, got {ticket_minutes}"
            )));
        }
        if samples == 0 {
            return Err(PatrolError::EstimationDegenerate);
        }
        Ok(Self {
            ticket_minutes,
            samples,
            scale: 10f64.powi(cache_precision.min(9) as i32),
            rng: ChaCha8Rng::seed_from_u64(seed),
            cache: HashMap::new(),
            simulations_run: 0,
        })
    }

    pub fn from_config(config: &EnforcementConfig) -> Result<Self> {
        Self::new(
            config.ticket_minutes,
            config.monte_carlo_samples,
            config.cache_precision,
            config.seed,
        )
    }

    /// Exact single-cop capture probability: `gap / (gap + ticket_minutes)`.
    pub fn single_cop_probability(&self, mean_gap_minutes: f64) -> f64 {
        if mean_gap_minutes.is_infinite() {
            return 1.0;
        }
        mean_gap_minutes / (mean_gap_minutes + self.ticket_minutes)
    }

    /// P(target driver is ticketed) for `cops` cops and target drivers
    /// arriving `mean_gap_minutes` apart on average.
    pub fn estimate(&mut self, mean_gap_minutes: f64, cops: usize) -> Result<f64> {
        if mean_gap_minutes.is_nan() || mean_gap_minutes <= 0.0 {
            return Err(PatrolError::param(format!(
                "mean gap must be positive, got {mean_gap_minutes}"
            )));
        }
        if cops < 1 {
            return Err(PatrolError::param("estimate needs at least one cop"));
        }
        if cops == 1 || mean_gap_minutes.is_infinite() {
            return Ok(self.single_cop_probability(mean_gap_minutes));
        }

        let key = CacheKey {
            scaled_gap: (mean_gap_minutes * self.scale).round() as i64,
            cops,
        };
        if let Some(&p) = self.cache.get(&key) {
            trace!(gap = mean_gap_minutes, cops, p, "estimate cache hit");
            return Ok(p);
        }

        // Simulate at the canonical gap so the cached value depends only on the key.
        let canonical_gap = key.scaled_gap as f64 / self.scale;
        let gap = if canonical_gap > 0.0 { canonical_gap } else { mean_gap_minutes };
        let p = self.simulate(gap, cops)?;
        self.cache.insert(key, p);
        Ok(p)
    }

    /// Monte Carlo over back-to-back target arrivals only; other classes do
    /// not interleave in this sub-simulation.
    fn simulate(&mut self, mean_gap_minutes: f64, cops: usize) -> Result<f64> {
        let mut pool = CopPool::new(cops, self.ticket_minutes, 0.0)?;
        let mut caught = 0usize;
        for gap in arrivals::gaps(&mut self.rng, mean_gap_minutes)?.take(self.samples) {
            pool.elapse(gap)?;
            if pool.is_front_available() {
                pool.issue_ticket(None)?;
                caught += 1;
            }
        }
        self.simulations_run += 1;
        let p = caught as f64 / self.samples as f64;
        debug!(gap = mean_gap_minutes, cops, samples = self.samples, p, "monte carlo estimate");
        Ok(p)
    }

    /// Number of Monte Carlo runs performed (cache misses).
    pub fn simulations_run(&self) -> u64 {
        self.simulations_run
    }

    pub fn cached_estimates(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn ticket_minutes(&self) -> f64 {
        self.ticket_minutes
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator(seed: u64) -> TicketProbabilityEstimator {
        TicketProbabilityEstimator::new(15.0, DEFAULT_SAMPLES, DEFAULT_CACHE_PRECISION, seed).unwrap()
    }

    #[test]
    fn test_single_cop_is_closed_form() {
        let mut est = estimator(0);
        let p = est.estimate(40.0, 1).unwrap();
        assert_eq!(p, 40.0 / 55.0);
        assert_eq!(est.simulations_run(), 0);
        assert_eq!(est.cached_estimates(), 0);
    }

    #[test]
    fn test_zero_samples_is_degenerate() {
        let err = TicketProbabilityEstimator::new(15.0, 0, 2, 0).err().unwrap();
        assert!(matches!(err, PatrolError::EstimationDegenerate));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let mut est = estimator(0);
        assert!(matches!(est.estimate(0.0, 2), Err(PatrolError::InvalidParameter(_))));
        assert!(matches!(est.estimate(-4.0, 2), Err(PatrolError::InvalidParameter(_))));
        assert!(matches!(est.estimate(10.0, 0), Err(PatrolError::InvalidParameter(_))));
        assert!(TicketProbabilityEstimator::new(0.0, 10, 2, 0).is_err());
        // Failed calls never populate the cache.
        assert_eq!(est.cached_estimates(), 0);
    }

    #[test]
    fn test_cache_is_idempotent_on_rounded_key() {
        let mut est = estimator(1);
        let a = est.estimate(10.0, 3).unwrap();
        let b = est.estimate(10.001, 3).unwrap(); // rounds to 10.00
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(est.simulations_run(), 1);

        est.estimate(10.0, 4).unwrap();
        assert_eq!(est.simulations_run(), 2);
        assert_eq!(est.cached_estimates(), 2);
    }

    #[test]
    fn test_probability_in_unit_interval() {
        let mut est = estimator(2);
        for cops in 2..6 {
            let p = est.estimate(3.0, cops).unwrap();
            assert!((0.0..=1.0).contains(&p), "p={} out of range", p);
        }
    }

    #[test]
    fn test_more_cops_catch_more() {
        let mut est = estimator(3);
        let mut prev = est.estimate(5.0, 1).unwrap();
        for cops in 2..6 {
            let p = est.estimate(5.0, cops).unwrap();
            assert!(p >= prev - 0.02, "p({})={} < p({})={}", cops, p, cops - 1, prev);
            prev = p;
        }
    }

    #[test]
    fn test_monte_carlo_is_consistent_with_closed_form_shape() {
        // With gaps far longer than the ticket time nearly everyone is caught.
        let mut est = estimator(4);
        let p = est.estimate(1_000.0, 2).unwrap();
        assert!(p > 0.98, "p={}", p);
    }

    #[test]
    fn test_infinite_gap_is_certain() {
        let mut est = estimator(5);
        assert_eq!(est.estimate(f64::INFINITY, 3).unwrap(), 1.0);
    }
}
