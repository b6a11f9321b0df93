// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator

pub mod error;
pub mod money;
pub mod profile;
pub mod arrivals;
pub mod cops;
pub mod estimator;
pub mod optimizer;
pub mod simulation;
pub mod config;
pub mod patrol;

pub use config::{EnforcementConfig, ProfileConfig};
pub use cops::{Cop, CopPool, CopSnapshot};
pub use error::{PatrolError, Result};
pub use estimator::TicketProbabilityEstimator;
pub use money::Dollars;
pub use optimizer::{PolicyDecision, PolicyOptimizer, TargetSelection, TrafficPattern};
pub use patrol::{Patrol, ProfileReport};
pub use profile::OffenseProfile;
pub use simulation::{DriverEvent, RunSummary, SimulationRun, TrafficSimulator};

use wasm_bindgen::prelude::*;

fn js_error(err: PatrolError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl Patrol {
    /// Default scenario with the given seed.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> std::result::Result<Patrol, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = EnforcementConfig { seed, ..Default::default() };
        Patrol::from_config(config).map_err(js_error)
    }

    /// Build from a JSON-encoded `EnforcementConfig`.
    pub fn from_config_json(json: &str) -> std::result::Result<Patrol, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        EnforcementConfig::from_json_str(json)
            .and_then(Patrol::from_config)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = optimize)]
    pub fn optimize_js(&mut self) -> std::result::Result<JsValue, JsValue> {
        let decision = self.optimize().map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&decision).unwrap_or(JsValue::NULL))
    }

    #[wasm_bindgen(js_name = simulate)]
    pub fn simulate_js(&mut self, minutes: f64) -> std::result::Result<JsValue, JsValue> {
        let run = self.simulate(minutes).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&run).unwrap_or(JsValue::NULL))
    }

    pub fn set_target_count(&mut self, count: usize) -> std::result::Result<(), JsValue> {
        self.pattern_mut().set_target_count(count).map_err(js_error)
    }

    pub fn set_cop_count(&mut self, count: usize) -> std::result::Result<(), JsValue> {
        self.pattern_mut().set_cop_count(count).map_err(js_error)
    }

    pub fn get_profiles(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.profile_reports()).unwrap_or(JsValue::NULL)
    }

    pub fn get_decision(&self) -> JsValue {
        match self.decision() {
            Some(d) => serde_wasm_bindgen::to_value(d).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    pub fn get_config(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.config()).unwrap_or(JsValue::NULL)
    }
}
