//! Scenario configuration
//!
//! A [`ScenarioConfig`] gathers the parameters of every pipeline stage. It is
//! usually loaded from TOML, where any omitted value takes its default:
//!
//! ```toml
//! [time]
//! start_time = 2025.0
//! stop_time = 2125.0
//! dt = 0.5
//!
//! [rebalance]
//! target_population = 8000.0
//!
//! [policy]
//! reward_start_year = 2025.0
//! initial_reward_value = 100.0
//!
//! [integrator]
//! type = "trend"
//! ```

use gcr_components::historical::HistoricalCO2Table;
use gcr_components::integrators::TrendIntegrator;
use gcr_components::parameters::{
    EmissionParameters, IntensityParameters, PolicyConfig, RebalanceParameters,
};
use gcr_core::diagnostics::{Diagnostic, FailurePolicy};
use gcr_core::errors::{GcrError, GcrResult};
use gcr_core::integrator::{InitialStocks, Integrator};
use gcr_core::timeseries::{FloatValue, Time, MAX_TIMESTEPS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Step used when the configured step is unusable
pub const DEFAULT_DT: Time = 0.5;
/// Initial reward used when the configured value is unusable
pub const DEFAULT_INITIAL_REWARD_VALUE: FloatValue = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// unit: yr
    /// default: 2025.0
    pub start_time: Time,
    /// Last timestep, inclusive
    /// unit: yr
    /// default: 2125.0
    pub stop_time: Time,
    /// unit: yr
    /// default: 0.5
    pub dt: Time,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            start_time: 2025.0,
            stop_time: 2125.0,
            dt: DEFAULT_DT,
        }
    }
}

/// Everything needed to run one scenario.
///
/// `policy: None` is a baseline run with no carbon reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub time: TimeConfig,
    pub initial_stocks: InitialStocks,
    pub rebalance: RebalanceParameters,
    pub intensity: IntensityParameters,
    pub emissions: EmissionParameters,
    pub policy: Option<PolicyConfig>,
    /// Measured CO2 record used for the atmospheric series and calibration
    pub calibration: HistoricalCO2Table,
    /// Scale emissions up to the calibration cutoff by the measured record
    /// default: true
    pub calibrate_emissions: bool,
    pub failure_policy: FailurePolicy,
    pub integrator: Arc<dyn Integrator>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            time: TimeConfig::default(),
            initial_stocks: InitialStocks::default(),
            rebalance: RebalanceParameters::default(),
            intensity: IntensityParameters::default(),
            emissions: EmissionParameters::default(),
            policy: None,
            calibration: HistoricalCO2Table::standard(),
            calibrate_emissions: true,
            failure_policy: FailurePolicy::default(),
            integrator: Arc::new(TrendIntegrator::default()),
        }
    }
}

fn clamp<T: std::fmt::Display + Copy>(
    diagnostics: &mut Vec<Diagnostic>,
    field: &str,
    value: &mut T,
    replacement: T,
    reason: &str,
) {
    warn!(field, value = %value, replacement = %replacement, reason, "Clamping configuration value");
    diagnostics.push(Diagnostic::new(
        None,
        field,
        format!("{reason}; {value} replaced by {replacement}"),
    ));
    *value = replacement;
}

impl ScenarioConfig {
    /// The configuration the original dashboard ran: 2025 to 2125 in half-year
    /// steps, a policy from 2025 with an initial reward of 100, and a target
    /// population of 8000 million.
    pub fn dashboard() -> Self {
        Self {
            rebalance: RebalanceParameters {
                target_population: Some(8000.0),
                ..Default::default()
            },
            policy: Some(PolicyConfig::default()),
            ..Default::default()
        }
    }

    /// The same scenario without a policy.
    pub fn baseline(&self) -> Self {
        Self {
            policy: None,
            ..self.clone()
        }
    }

    pub fn from_toml_str(contents: &str) -> GcrResult<Self> {
        toml::from_str(contents).map_err(|e| GcrError::InvalidConfiguration(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> GcrResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// A copy with invalid values clamped to the nearest valid value.
    ///
    /// Each clamp is logged and reported as a diagnostic; nothing is rejected.
    pub fn sanitised(&self) -> (Self, Vec<Diagnostic>) {
        let mut config = self.clone();
        let mut diagnostics = vec![];

        let defaults = TimeConfig::default();
        let time = &mut config.time;
        if !time.start_time.is_finite() {
            clamp(
                &mut diagnostics,
                "start_time",
                &mut time.start_time,
                defaults.start_time,
                "start_time must be finite",
            );
        }
        if !time.stop_time.is_finite() {
            let replacement = defaults.stop_time.max(time.start_time + defaults.dt);
            clamp(
                &mut diagnostics,
                "stop_time",
                &mut time.stop_time,
                replacement,
                "stop_time must be finite",
            );
        }
        if !(time.dt > 0.0) || !time.dt.is_finite() {
            clamp(&mut diagnostics, "dt", &mut time.dt, DEFAULT_DT, "dt must be positive");
        }
        if !(time.stop_time > time.start_time) {
            let replacement = time.start_time + time.dt;
            clamp(
                &mut diagnostics,
                "stop_time",
                &mut time.stop_time,
                replacement,
                "stop_time must be after start_time",
            );
        }
        let max_stop = time.start_time + time.dt * (MAX_TIMESTEPS - 1) as Time;
        if time.stop_time > max_stop {
            clamp(
                &mut diagnostics,
                "stop_time",
                &mut time.stop_time,
                max_stop,
                "too many timesteps",
            );
        }
        let start_time = time.start_time;

        if let Some(target) = config.rebalance.target_population {
            if !target.is_finite() || target < 0.0 {
                warn!(target, "Ignoring invalid target population");
                diagnostics.push(Diagnostic::new(
                    None,
                    "target_population",
                    format!("invalid target {target} treated as no target"),
                ));
                config.rebalance.target_population = None;
            }
        }

        if let Some(policy) = config.policy.as_mut() {
            if !(policy.reward_start_year >= start_time) {
                clamp(
                    &mut diagnostics,
                    "reward_start_year",
                    &mut policy.reward_start_year,
                    start_time,
                    "reward_start_year must not precede start_time",
                );
            }
            if !(policy.initial_reward_value > 0.0) || !policy.initial_reward_value.is_finite() {
                clamp(
                    &mut diagnostics,
                    "initial_reward_value",
                    &mut policy.initial_reward_value,
                    DEFAULT_INITIAL_REWARD_VALUE,
                    "initial_reward_value must be positive",
                );
            }
            if !(policy.propagation_window_length >= 0.0) {
                clamp(
                    &mut diagnostics,
                    "propagation_window_length",
                    &mut policy.propagation_window_length,
                    0.0,
                    "propagation_window_length must not be negative",
                );
            }
            if !(0.0..=1.0).contains(&policy.blend_weight) {
                let replacement = if policy.blend_weight > 1.0 { 1.0 } else { 0.0 };
                clamp(
                    &mut diagnostics,
                    "blend_weight",
                    &mut policy.blend_weight,
                    replacement,
                    "blend_weight must lie in [0, 1]",
                );
            }
        }

        (config, diagnostics)
    }
}
