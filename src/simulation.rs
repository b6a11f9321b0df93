// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Traffic Simulation
//
// Finite-horizon replay: draw the aggregate arrival schedule, classify each
// arrival by offense profile, then replay it through the cop pool and tag
// who got ticketed. Pacing and printing belong to the caller.

use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arrivals;
use crate::cops::{CopPool, CopSnapshot};
use crate::error::{PatrolError, Result};
use crate::money::Dollars;
use crate::optimizer::TrafficPattern;

/// Time advanced after the last arrival to let every cop finish.
const FLUSH_MINUTES: f64 = 1.0e9;

// ─── DriverEvent ─────────────────────────────────────────────────────────────

/// One driver passing the trap. Written once during replay, read-only after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverEvent {
    pub id: u64,
    /// Index into the pattern's profiles (descending severity).
    pub profile_index: usize,
    pub severity: f64,
    pub fine_amount: f64,
    /// Minutes from the start of the run.
    pub minutes: f64,
    /// Driver belongs to a targeted class.
    pub targeted: bool,
    pub ticketed: bool,
    /// The ticketing cop as it was when the ticket was written.
    pub cop: Option<CopSnapshot>,
}

impl DriverEvent {
    pub fn new(
        id: u64,
        profile_index: usize,
        severity: f64,
        fine_amount: f64,
        minutes: f64,
        targeted: bool,
    ) -> Self {
        Self {
            id,
            profile_index,
            severity,
            fine_amount,
            minutes,
            targeted,
            ticketed: false,
            cop: None,
        }
    }
}

// ─── RunSummary ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub drivers: u32,
    pub targeted: u32,
    pub ticketed: u32,
    pub missed_targets: u32,
    pub revenue: Dollars,
    pub revenue_per_hour: f64,
    /// Share of targeted drivers that were ticketed (1.0 with no targets).
    pub capture_rate: f64,
}

impl RunSummary {
    pub fn from_events(events: &[DriverEvent], duration_minutes: f64) -> Self {
        let drivers = events.len() as u32;
        let targeted = events.iter().filter(|e| e.targeted).count() as u32;
        let ticketed = events.iter().filter(|e| e.ticketed).count() as u32;
        let missed_targets = events.iter().filter(|e| e.targeted && !e.ticketed).count() as u32;
        let revenue: f64 = events
            .iter()
            .filter(|e| e.ticketed)
            .map(|e| e.fine_amount)
            .sum();
        Self {
            drivers,
            targeted,
            ticketed,
            missed_targets,
            revenue: Dollars::from_f64(revenue),
            revenue_per_hour: revenue / duration_minutes * 60.0,
            capture_rate: if targeted > 0 {
                (targeted - missed_targets) as f64 / targeted as f64
            } else {
                1.0
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRun {
    pub duration_minutes: f64,
    pub cop_count: usize,
    pub target_count: usize,
    pub events: Vec<DriverEvent>,
    pub summary: RunSummary,
}

// ─── TrafficSimulator ────────────────────────────────────────────────────────

pub struct TrafficSimulator {
    rng: ChaCha8Rng,
}

impl TrafficSimulator {
    pub fn new(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }

    /// Draw `duration_minutes` of traffic for `pattern` and replay it through
    /// `pool`, ticketing target drivers whenever the head cop is free.
    pub fn run(
        &mut self,
        pattern: &TrafficPattern,
        pool: &mut CopPool,
        duration_minutes: f64,
    ) -> Result<SimulationRun> {
        let times = arrivals::schedule(
            &mut self.rng,
            pattern.aggregate().mean_gap_minutes(),
            duration_minutes,
        )?;
        let classes = WeightedIndex::new(pattern.weights())
            .map_err(|e| PatrolError::config(format!("profile weights: {e}")))?;

        let profiles = pattern.profiles();
        let mut events: Vec<DriverEvent> = times
            .into_iter()
            .enumerate()
            .map(|(i, minutes)| {
                let idx = classes.sample(&mut self.rng);
                let profile = &profiles[idx];
                DriverEvent::new(
                    i as u64,
                    idx,
                    profile.severity(),
                    profile.fine_amount(),
                    minutes,
                    pattern.is_target(idx),
                )
            })
            .collect();

        let mut clock = 0.0;
        for event in events.iter_mut() {
            pool.elapse(event.minutes - clock)?;
            clock = event.minutes;
            if event.targeted && pool.is_front_available() {
                pool.issue_ticket(Some(event))?;
            }
        }
        pool.elapse(FLUSH_MINUTES)?;

        let summary = RunSummary::from_events(&events, duration_minutes);
        debug!(
            drivers = summary.drivers,
            targeted = summary.targeted,
            ticketed = summary.ticketed,
            cops = pool.len(),
            "simulation run complete"
        );
        Ok(SimulationRun {
            duration_minutes,
            cop_count: pool.len(),
            target_count: pattern.target_count(),
            events,
            summary,
        })
    }
}
