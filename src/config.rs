// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Configuration
//
// Every field has a default, so a config file only needs to name what it
// changes. Loaded from TOML or JSON and validated before use.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PatrolError, Result};
use crate::estimator::{DEFAULT_CACHE_PRECISION, DEFAULT_SAMPLES};
use crate::optimizer::{TrafficPattern, DEFAULT_MAX_COPS};
use crate::profile::OffenseProfile;

/// One offense class as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Miles per hour over the limit.
    pub severity: f64,
    pub mean_gap_minutes: f64,
    /// Defaults to ten dollars per mph over.
    #[serde(default)]
    pub fine_amount: Option<f64>,
}

impl ProfileConfig {
    pub fn new(severity: f64, mean_gap_minutes: f64) -> Self {
        Self { severity, mean_gap_minutes, fine_amount: None }
    }

    pub fn to_profile(&self) -> Result<OffenseProfile> {
        match self.fine_amount {
            Some(fine) => OffenseProfile::new(self.severity, self.mean_gap_minutes, fine),
            None => OffenseProfile::with_default_fine(self.severity, self.mean_gap_minutes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcementConfig {
    /// Minutes a cop is tied up writing one ticket.
    pub ticket_minutes: f64,
    pub cost_per_cop_per_hour: f64,
    pub monte_carlo_samples: usize,
    /// Decimal places of the mean gap kept in the estimate cache key.
    pub cache_precision: u32,
    /// Upper bound for the cop-count search.
    pub max_cops: usize,
    pub seed: u64,
    pub profiles: Vec<ProfileConfig>,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            ticket_minutes: 15.0,
            cost_per_cop_per_hour: 300.0,
            monte_carlo_samples: DEFAULT_SAMPLES,
            cache_precision: DEFAULT_CACHE_PRECISION,
            max_cops: DEFAULT_MAX_COPS,
            seed: 0,
            profiles: vec![
                ProfileConfig::new(5.0, 5.0),
                ProfileConfig::new(10.0, 10.0),
                ProfileConfig::new(15.0, 20.0),
                ProfileConfig::new(20.0, 40.0),
            ],
        }
    }
}

impl EnforcementConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| PatrolError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| PatrolError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a `.json` file as JSON and anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ticket_minutes.is_finite() && self.ticket_minutes > 0.0) {
            return Err(PatrolError::param(format!(
                "ticket_minutes must be positive, got {}",
                self.ticket_minutes
            )));
        }
        if !(self.cost_per_cop_per_hour.is_finite() && self.cost_per_cop_per_hour >= 0.0) {
            return Err(PatrolError::config(format!(
                "cost_per_cop_per_hour must be non-negative, got {}",
                self.cost_per_cop_per_hour
            )));
        }
        if self.monte_carlo_samples == 0 {
            return Err(PatrolError::EstimationDegenerate);
        }
        if self.max_cops == 0 {
            return Err(PatrolError::config("max_cops must be at least 1"));
        }
        if self.profiles.is_empty() {
            return Err(PatrolError::config("no driver profiles provided"));
        }
        for profile in &self.profiles {
            profile.to_profile()?;
        }
        Ok(())
    }

    pub fn offense_profiles(&self) -> Result<Vec<OffenseProfile>> {
        self.profiles.iter().map(ProfileConfig::to_profile).collect()
    }

    pub fn traffic_pattern(&self) -> Result<TrafficPattern> {
        TrafficPattern::new(self.offense_profiles()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EnforcementConfig::default();
        config.validate().unwrap();
        assert_eq!(config.profiles.len(), 4);
        assert_eq!(config.ticket_minutes, 15.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EnforcementConfig::from_toml_str(
            r#"
            cost_per_cop_per_hour = 120.0
            seed = 7

            [[profiles]]
            severity = 25.0
            mean_gap_minutes = 60.0
            fine_amount = 400.0

            [[profiles]]
            severity = 10.0
            mean_gap_minutes = 8.0
            "#,
        )
        .unwrap();
        assert_eq!(config.cost_per_cop_per_hour, 120.0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.ticket_minutes, 15.0);
        let profiles = config.offense_profiles().unwrap();
        assert_eq!(profiles[0].fine_amount(), 400.0);
        assert_eq!(profiles[1].fine_amount(), 100.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EnforcementConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EnforcementConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(matches!(
            EnforcementConfig::from_toml_str("profiles = []"),
            Err(PatrolError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            EnforcementConfig::from_toml_str("monte_carlo_samples = 0"),
            Err(PatrolError::EstimationDegenerate)
        ));
        assert!(matches!(
            EnforcementConfig::from_toml_str("ticket_minutes = -1.0"),
            Err(PatrolError::InvalidParameter(_))
        ));
        assert!(matches!(
            EnforcementConfig::from_toml_str(
                "[[profiles]]\nseverity = 5.0\nmean_gap_minutes = 0.0\n"
            ),
            Err(PatrolError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            EnforcementConfig::from_toml_str("seed = \"x\""),
            Err(PatrolError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EnforcementConfig::load(Path::new("/nonexistent/patrol.toml")).unwrap_err();
        assert!(matches!(err, PatrolError::Io(_)));
    }
}
