// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Enforcement Policy Optimizer
//
// Picks which offense classes to ticket and how many cops to deploy so that
// expected hourly net revenue is highest:
//
//   net = P(catch | target gap, cops) × target revenue opportunity − cops × cost
//
// Both searches are hill climbs over restricted spaces and stop on the first
// step that does not improve:
//   - target sets are only ever "the k most severe classes" (nested prefixes),
//   - cop counts only ever grow one at a time from a single cop.
// The chosen policy is the best along that walk, not over arbitrary subsets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EnforcementConfig;
use crate::error::{PatrolError, Result};
use crate::estimator::TicketProbabilityEstimator;
use crate::money::Dollars;
use crate::profile::OffenseProfile;

pub const DEFAULT_MAX_COPS: usize = 32;

// ─── TrafficPattern ──────────────────────────────────────────────────────────

/// All offense classes passing the trap plus the current enforcement policy.
///
/// Profiles are held in descending severity (ties keep input order), and the
/// target set is always a prefix of that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PatternFields")]
pub struct TrafficPattern {
    profiles: Vec<OffenseProfile>,
    aggregate: OffenseProfile,
    weights: Vec<f64>,
    target_count: usize,
    cop_count: usize,
}

/// Serialized form accepted on load. Sorting, weights and the aggregate
/// are rebuilt rather than trusted.
#[derive(Deserialize)]
struct PatternFields {
    profiles: Vec<OffenseProfile>,
    #[serde(default = "one")]
    target_count: usize,
    #[serde(default = "one")]
    cop_count: usize,
}

fn one() -> usize {
    1
}

impl TryFrom<PatternFields> for TrafficPattern {
    type Error = PatrolError;

    fn try_from(fields: PatternFields) -> Result<Self> {
        let mut pattern = Self::new(fields.profiles)?;
        pattern.set_target_count(fields.target_count)?;
        pattern.set_cop_count(fields.cop_count)?;
        Ok(pattern)
    }
}

impl TrafficPattern {
    pub fn new(mut profiles: Vec<OffenseProfile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(PatrolError::config("no driver profiles provided"));
        }
        if profiles.iter().any(OffenseProfile::is_null) {
            return Err(PatrolError::config("driver profiles must have a positive arrival rate"));
        }
        profiles.sort_by(|a, b| b.severity().total_cmp(&a.severity()));
        let aggregate = OffenseProfile::aggregate(&profiles);
        let total_rate = aggregate.arrival_rate_per_min();
        let weights = profiles
            .iter()
            .map(|p| p.arrival_rate_per_min() / total_rate)
            .collect();
        Ok(Self {
            profiles,
            aggregate,
            weights,
            target_count: 1,
            cop_count: 1,
        })
    }

    /// Profiles from `(severity, mean gap)` pairs, fined ten dollars per mph.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let profiles = pairs
            .iter()
            .map(|&(severity, gap)| OffenseProfile::with_default_fine(severity, gap))
            .collect::<Result<Vec<_>>>()?;
        Self::new(profiles)
    }

    /// Profiles in descending severity.
    pub fn profiles(&self) -> &[OffenseProfile] {
        &self.profiles
    }

    /// Combined profile of all drivers.
    pub fn aggregate(&self) -> &OffenseProfile {
        &self.aggregate
    }

    /// Each profile's share of the aggregate arrival rate, aligned with `profiles()`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn target_profiles(&self) -> &[OffenseProfile] {
        &self.profiles[..self.target_count]
    }

    pub fn target_aggregate(&self) -> OffenseProfile {
        OffenseProfile::aggregate(self.target_profiles())
    }

    pub fn is_target(&self, profile_index: usize) -> bool {
        profile_index < self.target_count
    }

    pub fn cop_count(&self) -> usize {
        self.cop_count
    }

    pub fn set_target_count(&mut self, count: usize) -> Result<()> {
        if count < 1 || count > self.profiles.len() {
            return Err(PatrolError::config(format!(
                "target count {} outside 1..={}",
                count,
                self.profiles.len()
            )));
        }
        self.target_count = count;
        Ok(())
    }

    pub fn set_cop_count(&mut self, count: usize) -> Result<()> {
        if count < 1 {
            return Err(PatrolError::config("at least one cop must be deployed"));
        }
        self.cop_count = count;
        Ok(())
    }

    /// Adopt an optimizer decision as the current policy.
    pub fn apply(&mut self, decision: &PolicyDecision) -> Result<()> {
        self.set_target_count(decision.target_count)?;
        self.set_cop_count(decision.cop_count)
    }
}

// ─── Decisions ───────────────────────────────────────────────────────────────

/// Best target prefix found for a fixed cop count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSelection {
    pub target_count: usize,
    pub target_aggregate: OffenseProfile,
    pub capture_probability: f64,
    pub net_revenue_per_hour: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub target_profiles: Vec<OffenseProfile>,
    pub target_count: usize,
    pub cop_count: usize,
    pub capture_probability: f64,
    pub gross_revenue_per_hour: f64,
    pub cost_per_hour: f64,
    pub net_revenue_per_hour: f64,
}

impl PolicyDecision {
    pub fn net_revenue(&self) -> Dollars {
        Dollars::from_f64(self.net_revenue_per_hour)
    }

    /// Least severe class still ticketed.
    pub fn severity_threshold(&self) -> f64 {
        self.target_profiles
            .last()
            .map(OffenseProfile::severity)
            .unwrap_or(0.0)
    }
}

// ─── PolicyOptimizer ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyOptimizer {
    cost_per_cop_per_hour: f64,
    max_cops: usize,
}

impl PolicyOptimizer {
    pub fn new(cost_per_cop_per_hour: f64, max_cops: usize) -> Result<Self> {
        if !(cost_per_cop_per_hour.is_finite() && cost_per_cop_per_hour >= 0.0) {
            return Err(PatrolError::config(format!(
                "cost per cop must be non-negative, got {cost_per_cop_per_hour}"
            )));
        }
        if max_cops < 1 {
            return Err(PatrolError::config("max_cops must be at least 1"));
        }
        Ok(Self { cost_per_cop_per_hour, max_cops })
    }

    pub fn from_config(config: &EnforcementConfig) -> Result<Self> {
        Self::new(config.cost_per_cop_per_hour, config.max_cops)
    }

    /// `(net revenue per hour, capture probability)` for ticketing `target`
    /// with `cops` cops.
    pub fn net_revenue(
        &self,
        estimator: &mut TicketProbabilityEstimator,
        target: &OffenseProfile,
        cops: usize,
    ) -> Result<(f64, f64)> {
        let p = estimator.estimate(target.mean_gap_minutes(), cops)?;
        let net = p * target.revenue_opportunity_per_hour() - cops as f64 * self.cost_per_cop_per_hour;
        Ok((net, p))
    }

    /// Grow the target set from the most severe class while net revenue
    /// strictly improves.
    pub fn optimize_target_profiles(
        &self,
        pattern: &TrafficPattern,
        estimator: &mut TicketProbabilityEstimator,
        cops: usize,
    ) -> Result<TargetSelection> {
        let profiles = pattern.profiles();
        let mut best_aggregate = profiles[0];
        let (mut best_net, mut best_p) = self.net_revenue(estimator, &best_aggregate, cops)?;
        let mut target_count = 1;

        for next in &profiles[1..] {
            let candidate = best_aggregate.combine(next);
            let (net, p) = self.net_revenue(estimator, &candidate, cops)?;
            debug!(cops, prefix = target_count + 1, net, best_net, "consider wider target set");
            if net <= best_net {
                break;
            }
            best_aggregate = candidate;
            best_net = net;
            best_p = p;
            target_count += 1;
        }

        Ok(TargetSelection {
            target_count,
            target_aggregate: best_aggregate,
            capture_probability: best_p,
            net_revenue_per_hour: best_net,
        })
    }

    /// Add cops one at a time, re-optimizing the target set each time, while
    /// net revenue does not fall. On the first drop the previous cop count
    /// and the target set chosen for it are kept.
    pub fn optimize_cop_count(
        &self,
        pattern: &TrafficPattern,
        estimator: &mut TicketProbabilityEstimator,
    ) -> Result<PolicyDecision> {
        let mut cops = 1;
        let mut best = self.optimize_target_profiles(pattern, estimator, cops)?;

        while cops < self.max_cops {
            let selection = self.optimize_target_profiles(pattern, estimator, cops + 1)?;
            debug!(
                cops = cops + 1,
                net = selection.net_revenue_per_hour,
                best_net = best.net_revenue_per_hour,
                "consider another cop"
            );
            if selection.net_revenue_per_hour < best.net_revenue_per_hour {
                break;
            }
            cops += 1;
            best = selection;
        }

        let cost_per_hour = cops as f64 * self.cost_per_cop_per_hour;
        Ok(PolicyDecision {
            target_profiles: pattern.profiles()[..best.target_count].to_vec(),
            target_count: best.target_count,
            cop_count: cops,
            capture_probability: best.capture_probability,
            gross_revenue_per_hour: best.net_revenue_per_hour + cost_per_hour,
            cost_per_hour,
            net_revenue_per_hour: best.net_revenue_per_hour,
        })
    }

    pub fn cost_per_cop_per_hour(&self) -> f64 {
        self.cost_per_cop_per_hour
    }

    pub fn max_cops(&self) -> usize {
        self.max_cops
    }
}
