// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Repeated Runs
//
// N traffic runs under a fixed policy with seeds base..base+N, aggregated
// into mean and 95% CI per metric.

use speed_trap::{CopPool, EnforcementConfig, Result, RunSummary, TrafficPattern, TrafficSimulator};
use tracing::debug;

use crate::report::{BatchReport, MetricSpread};

pub fn run_single(
    config: &EnforcementConfig,
    pattern: &TrafficPattern,
    minutes: f64,
    seed: u64,
) -> Result<RunSummary> {
    let mut pool = CopPool::new(pattern.cop_count(), config.ticket_minutes, config.cost_per_cop_per_hour)?;
    let run = TrafficSimulator::new(seed).run(pattern, &mut pool, minutes)?;
    Ok(run.summary)
}

pub fn run_monte_carlo(
    config: &EnforcementConfig,
    pattern: &TrafficPattern,
    minutes: f64,
    runs: usize,
    base_seed: u64,
) -> Result<BatchReport> {
    let cost_per_hour = pattern.cop_count() as f64 * config.cost_per_cop_per_hour;
    let summaries = (0..runs as u64)
        .map(|i| run_single(config, pattern, minutes, base_seed.wrapping_add(i)))
        .collect::<Result<Vec<_>>>()?;
    debug!(runs, minutes, "batch complete");

    let collect = |f: fn(&RunSummary) -> f64| summaries.iter().map(f).collect::<Vec<f64>>();
    let revenue = collect(|s| s.revenue_per_hour);
    let net: Vec<f64> = revenue.iter().map(|r| r - cost_per_hour).collect();

    Ok(BatchReport {
        runs,
        base_seed,
        minutes,
        revenue_per_hour: MetricSpread::of(&revenue),
        net_revenue_per_hour: MetricSpread::of(&net),
        capture_rate: MetricSpread::of(&collect(|s| s.capture_rate)),
        drivers: MetricSpread::of(&collect(|s| s.drivers as f64)),
        ticketed: MetricSpread::of(&collect(|s| s.ticketed as f64)),
    })
}
