// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Report Types

use serde::Serialize;
use speed_trap::{PolicyDecision, ProfileReport, RunSummary};

// ─── Metric Spread ───────────────────────────────────────────────────────────

/// z for a two-sided 95% normal interval.
const Z_95: f64 = 1.96;

/// How one metric varied across seeded traffic runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricSpread {
    pub runs: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub std_dev: f64,
    /// Half-width of the 95% interval around `mean`.
    pub margin: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricSpread {
    pub fn of(values: &[f64]) -> Self {
        let runs = values.len();
        if runs == 0 {
            return Self::default();
        }
        let (min, max, total) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(lo, hi, total), &v| (lo.min(v), hi.max(v), total + v),
        );
        let mean = total / runs as f64;
        let std_dev = if runs > 1 {
            let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (squares / (runs - 1) as f64).sqrt()
        } else {
            0.0
        };
        Self {
            runs,
            mean,
            std_dev,
            margin: Z_95 * std_dev / (runs as f64).sqrt(),
            min,
            max,
        }
    }

    pub fn interval(&self) -> (f64, f64) {
        (self.mean - self.margin, self.mean + self.margin)
    }
}

// ─── Batch Report ────────────────────────────────────────────────────────────

/// Aggregate over repeated traffic runs under one policy.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub runs: usize,
    pub base_seed: u64,
    pub minutes: f64,
    pub revenue_per_hour: MetricSpread,
    pub net_revenue_per_hour: MetricSpread,
    pub capture_rate: MetricSpread,
    pub drivers: MetricSpread,
    pub ticketed: MetricSpread,
}

/// Everything the CLI prints with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct PatrolReport {
    pub profiles: Vec<ProfileReport>,
    pub decision: PolicyDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_run: Option<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchReport>,
}
