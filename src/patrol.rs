// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Patrol Facade
//
// Owns one enforcement setup end to end: the traffic pattern, the memoizing
// estimator, the optimizer and a seeded simulator. The JS interface in
// lib.rs wraps this type.

use serde::Serialize;
use tracing::info;
use wasm_bindgen::prelude::*;

use crate::config::EnforcementConfig;
use crate::cops::CopPool;
use crate::error::Result;
use crate::estimator::TicketProbabilityEstimator;
use crate::money::Dollars;
use crate::optimizer::{PolicyDecision, PolicyOptimizer, TrafficPattern};
use crate::simulation::{SimulationRun, TrafficSimulator};

/// Per-profile summary used by reports and the JS interface.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub severity: f64,
    pub mean_gap_minutes: f64,
    pub fine_amount: f64,
    pub share_of_traffic: f64,
    pub single_cop_revenue_per_hour: Dollars,
    pub targeted: bool,
}

#[wasm_bindgen]
pub struct Patrol {
    config: EnforcementConfig,
    pattern: TrafficPattern,
    estimator: TicketProbabilityEstimator,
    optimizer: PolicyOptimizer,
    simulator: TrafficSimulator,
    decision: Option<PolicyDecision>,
}

impl Patrol {
    pub fn from_config(config: EnforcementConfig) -> Result<Self> {
        config.validate()?;
        let pattern = config.traffic_pattern()?;
        let estimator = TicketProbabilityEstimator::from_config(&config)?;
        let optimizer = PolicyOptimizer::from_config(&config)?;
        // Offset so traffic draws do not replay the estimator's stream.
        let simulator = TrafficSimulator::new(config.seed.wrapping_add(1));
        Ok(Self {
            config,
            pattern,
            estimator,
            optimizer,
            simulator,
            decision: None,
        })
    }

    /// Run the two-level search and adopt its result as the current policy.
    pub fn optimize(&mut self) -> Result<PolicyDecision> {
        let decision = self
            .optimizer
            .optimize_cop_count(&self.pattern, &mut self.estimator)?;
        self.pattern.apply(&decision)?;
        info!(
            cops = decision.cop_count,
            targets = decision.target_count,
            threshold = decision.severity_threshold(),
            net = %decision.net_revenue(),
            "enforcement policy chosen"
        );
        self.decision = Some(decision.clone());
        Ok(decision)
    }

    /// Replay `minutes` of traffic under the current policy with a fresh pool.
    pub fn simulate(&mut self, minutes: f64) -> Result<SimulationRun> {
        let mut pool = CopPool::new(
            self.pattern.cop_count(),
            self.config.ticket_minutes,
            self.config.cost_per_cop_per_hour,
        )?;
        self.simulator.run(&self.pattern, &mut pool, minutes)
    }

    pub fn profile_reports(&self) -> Vec<ProfileReport> {
        self.pattern
            .profiles()
            .iter()
            .zip(self.pattern.weights())
            .enumerate()
            .map(|(i, (p, &share))| ProfileReport {
                severity: p.severity(),
                mean_gap_minutes: p.mean_gap_minutes(),
                fine_amount: p.fine_amount(),
                share_of_traffic: share,
                single_cop_revenue_per_hour: p.single_cop_revenue_per_hour(self.config.ticket_minutes),
                targeted: self.pattern.is_target(i),
            })
            .collect()
    }

    pub fn config(&self) -> &EnforcementConfig {
        &self.config
    }

    pub fn pattern(&self) -> &TrafficPattern {
        &self.pattern
    }

    pub fn pattern_mut(&mut self) -> &mut TrafficPattern {
        &mut self.pattern
    }

    pub fn decision(&self) -> Option<&PolicyDecision> {
        self.decision.as_ref()
    }

    pub fn estimator(&self) -> &TicketProbabilityEstimator {
        &self.estimator
    }
}
