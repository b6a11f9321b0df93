// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Arrival Process
//
// Exponential inter-arrival gaps (Poisson arrivals) for a given mean gap,
// and finite schedules of cumulative arrival times.

use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::error::{PatrolError, Result};

fn exp_for_mean(mean_minutes: f64) -> Result<Exp<f64>> {
    // An infinite mean is the null-profile sentinel: every gap is infinite.
    if mean_minutes.is_nan() || mean_minutes <= 0.0 {
        return Err(PatrolError::param(format!(
            "mean gap must be positive, got {mean_minutes}"
        )));
    }
    let rate = 1.0 / mean_minutes;
    if !rate.is_finite() {
        return Err(PatrolError::param(format!(
            "mean gap {mean_minutes} is too small to sample"
        )));
    }
    Exp::new(rate).map_err(|e| PatrolError::param(e.to_string()))
}

/// One exponential draw with the given mean, in minutes.
pub fn next_gap<R: Rng + ?Sized>(rng: &mut R, mean_minutes: f64) -> Result<f64> {
    let exp = exp_for_mean(mean_minutes)?;
    Ok(exp.sample(rng))
}

/// Endless stream of independent gaps drawn from `rng`.
pub struct Gaps<'a, R: Rng + ?Sized> {
    rng: &'a mut R,
    exp: Exp<f64>,
}

impl<'a, R: Rng + ?Sized> Iterator for Gaps<'a, R> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.exp.sample(&mut *self.rng))
    }
}

/// Lazy gap sequence. Each call is an independent realization.
pub fn gaps<R: Rng + ?Sized>(rng: &mut R, mean_minutes: f64) -> Result<Gaps<'_, R>> {
    let exp = exp_for_mean(mean_minutes)?;
    Ok(Gaps { rng, exp })
}

/// Cumulative arrival times, accumulating gaps until the clock reaches
/// `duration_minutes`.
///
/// The arrival that crosses the boundary is kept, so the last element may
/// lie past `duration_minutes`.
pub fn schedule<R: Rng + ?Sized>(
    rng: &mut R,
    mean_minutes: f64,
    duration_minutes: f64,
) -> Result<Vec<f64>> {
    if !(duration_minutes > 0.0) {
        return Err(PatrolError::param(format!(
            "duration must be positive, got {duration_minutes}"
        )));
    }
    let mut elapsed = 0.0;
    let mut times = Vec::new();
    for gap in gaps(rng, mean_minutes)? {
        if elapsed >= duration_minutes {
            break;
        }
        elapsed += gap;
        times.push(elapsed);
    }
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_gap_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 20_000;
        let sum: f64 = gaps(&mut rng, 8.0).unwrap().take(n).sum();
        let mean = sum / n as f64;
        assert!((mean - 8.0).abs() < 0.3, "gap mean {} far from 8.0", mean);
    }

    #[test]
    fn test_gaps_are_positive() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(gaps(&mut rng, 2.0).unwrap().take(1000).all(|g| g >= 0.0));
    }

    #[test]
    fn test_rejects_bad_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(next_gap(&mut rng, 0.0), Err(PatrolError::InvalidParameter(_))));
        assert!(matches!(next_gap(&mut rng, -1.0), Err(PatrolError::InvalidParameter(_))));
        assert!(matches!(next_gap(&mut rng, f64::NAN), Err(PatrolError::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_mean_with_infinite_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(gaps(&mut rng, 1e-320), Err(PatrolError::InvalidParameter(_))));
        assert!(matches!(
            schedule(&mut rng, 1e-320, 60.0),
            Err(PatrolError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_schedule_is_increasing_and_covers_duration() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let times = schedule(&mut rng, 2.0, 120.0).unwrap();
        assert!(!times.is_empty());
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert!(*times.last().unwrap() >= 120.0);
        // Only the final arrival may cross the boundary.
        assert!(times[..times.len() - 1].iter().all(|&t| t < 120.0));
    }

    #[test]
    fn test_schedule_rejects_non_positive_duration() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(matches!(schedule(&mut rng, 2.0, 0.0), Err(PatrolError::InvalidParameter(_))));
    }

    #[test]
    fn test_null_mean_schedules_one_infinite_arrival() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let times = schedule(&mut rng, f64::INFINITY, 60.0).unwrap();
        assert_eq!(times.len(), 1);
        assert!(times[0].is_infinite());
    }

    #[test]
    fn test_same_seed_same_schedule() {
        let a = schedule(&mut ChaCha8Rng::seed_from_u64(9), 5.0, 60.0).unwrap();
        let b = schedule(&mut ChaCha8Rng::seed_from_u64(9), 5.0, 60.0).unwrap();
        assert_eq!(a, b);
    }
}
