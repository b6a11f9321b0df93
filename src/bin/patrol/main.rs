// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Patrol CLI
//
// Usage:
//   cargo run --release --bin patrol                          # default scenario, one hour
//   cargo run --release --bin patrol -- --config trap.toml    # custom profiles and costs
//   cargo run --release --bin patrol -- --runs 30 --minutes 480
//   cargo run --release --bin patrol -- --realtime-scale 30   # paced playback
//   cargo run --release --bin patrol -- --json                # machine-readable report

mod logging;
mod monte_carlo;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use speed_trap::{EnforcementConfig, Patrol, PolicyDecision, Result, SimulationRun};
use tracing::error;

use logging::{init_logging, LogFormat};
use report::{BatchReport, PatrolReport};

// ─── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "patrol", about = "Pick a speed trap policy and simulate the traffic it sees")]
struct Args {
    /// TOML or JSON enforcement config; defaults to the built-in scenario.
    #[arg(long, env = "PATROL_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the config seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated minutes per run.
    #[arg(long, default_value_t = 60.0)]
    minutes: f64,

    /// Traffic runs; more than one reports mean and 95% CI instead of playback.
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Overrides the config Monte Carlo sample count.
    #[arg(long)]
    samples: Option<usize>,

    /// Playback speed-up over real time (30 plays an hour in two minutes);
    /// 0 disables pacing.
    #[arg(long, default_value_t = 0.0)]
    realtime_scale: f64,

    #[arg(long)]
    json: bool,

    #[arg(long, default_value = "info", env = "PATROL_LOG")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

impl Args {
    fn enforcement_config(&self) -> Result<EnforcementConfig> {
        let mut config = match &self.config {
            Some(path) => EnforcementConfig::load(path)?,
            None => EnforcementConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(samples) = self.samples {
            config.monte_carlo_samples = samples;
        }
        config.validate()?;
        Ok(config)
    }
}

// ─── Output ──────────────────────────────────────────────────────────────────

fn print_policy(patrol: &Patrol, decision: &PolicyDecision) {
    println!("\n  Speed trap policy");
    println!("  {:>8} {:>10} {:>8} {:>8} {:>14}", "MPH over", "Gap (min)", "Fine", "Share", "1-cop $/hr");
    println!("  {}", "-".repeat(56));
    for p in patrol.profile_reports() {
        println!(
            "  {:>8.1} {:>10.2} {:>8.2} {:>7.1}% {:>14}  {}",
            p.severity,
            p.mean_gap_minutes,
            p.fine_amount,
            p.share_of_traffic * 100.0,
            p.single_cop_revenue_per_hour.to_string(),
            if p.targeted { "TARGET" } else { "" },
        );
    }
    println!(
        "\n  Ticket drivers {:.1}+ mph over with {} cop(s): capture {:.1}%, net {} / hr\n",
        decision.severity_threshold(),
        decision.cop_count,
        decision.capture_probability * 100.0,
        decision.net_revenue(),
    );
}

/// Real time to wait for `sim_minutes` of traffic at `realtime_scale`x speed.
fn pacing(sim_minutes: f64, realtime_scale: f64) -> Option<Duration> {
    if !(realtime_scale > 0.0) {
        return None;
    }
    let real_secs = sim_minutes * 60.0 / realtime_scale;
    Duration::try_from_secs_f64(real_secs.max(0.0)).ok()
}

fn play_back(run: &SimulationRun, realtime_scale: f64) {
    let mut clock = 0.0;
    for event in &run.events {
        if let Some(wait) = pacing(event.minutes - clock, realtime_scale) {
            std::thread::sleep(wait);
        }
        clock = event.minutes;
        if event.ticketed {
            println!("{} (ticketed ${})", event.severity, event.fine_amount);
        } else {
            println!("{}", event.severity);
        }
    }
    let s = &run.summary;
    println!(
        "\n  {} drivers, {} targeted, {} ticketed, {} missed: {} ({:.2} / hr)",
        s.drivers, s.targeted, s.ticketed, s.missed_targets, s.revenue, s.revenue_per_hour
    );
}

fn print_batch(batch: &BatchReport) {
    println!(
        "  {} runs x {} min (seeds {}..{})",
        batch.runs,
        batch.minutes,
        batch.base_seed,
        batch.base_seed + batch.runs as u64
    );
    for (name, s) in [
        ("revenue / hr", &batch.revenue_per_hour),
        ("net / hr", &batch.net_revenue_per_hour),
        ("capture rate", &batch.capture_rate),
        ("drivers", &batch.drivers),
        ("ticketed", &batch.ticketed),
    ] {
        println!("  {:<14} {:>10.2} ± {:<8.2} [{:.2}, {:.2}]", name, s.mean, s.margin, s.min, s.max);
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn run(args: &Args) -> Result<()> {
    let config = args.enforcement_config()?;
    let mut patrol = Patrol::from_config(config.clone())?;
    let decision = patrol.optimize()?;

    let mut report = PatrolReport {
        profiles: patrol.profile_reports(),
        decision,
        single_run: None,
        batch: None,
    };

    if args.runs > 1 {
        let batch = monte_carlo::run_monte_carlo(
            &config,
            patrol.pattern(),
            args.minutes,
            args.runs,
            config.seed,
        )?;
        if !args.json {
            print_policy(&patrol, &report.decision);
            print_batch(&batch);
        }
        report.batch = Some(batch);
    } else {
        if !args.json {
            print_policy(&patrol, &report.decision);
        }
        let sim = patrol.simulate(args.minutes)?;
        if !args.json {
            play_back(&sim, args.realtime_scale);
        }
        report.single_run = Some(sim.summary);
    }

    if args.json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| speed_trap::PatrolError::Parse(e.to_string()))?;
        println!("{out}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_format);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "patrol failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacing_is_a_speed_up() {
        // One simulated minute at 30x takes two real seconds.
        assert_eq!(pacing(1.0, 30.0), Some(Duration::from_secs(2)));
        assert_eq!(pacing(60.0, 60.0), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_pacing_disabled() {
        assert_eq!(pacing(5.0, 0.0), None);
        assert_eq!(pacing(5.0, -1.0), None);
        assert_eq!(pacing(5.0, f64::NAN), None);
    }
}
