//! Baseline versus policy comparison

use crate::config::ScenarioConfig;
use crate::results::SimulationResults;
use crate::scenario::Scenario;
use gcr_core::errors::{GcrError, GcrResult};
use gcr_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A policy run alongside the same scenario without a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    baseline: SimulationResults,
    policy: SimulationResults,
}

impl ScenarioComparison {
    /// Run the baseline and policy scenarios concurrently.
    ///
    /// The two runs share nothing; each owns its own configuration and state.
    pub fn run(config: &ScenarioConfig) -> GcrResult<Self> {
        let baseline = Scenario::new(config.baseline());
        let policy = Scenario::new(config.clone());

        let (baseline, policy) = rayon::join(|| baseline.run(), || policy.run());
        let comparison = Self {
            baseline: baseline?,
            policy: policy?,
        };
        info!(
            steps = comparison.policy.len(),
            rewards = comparison.policy.reward_history().len(),
            "Comparison complete"
        );
        Ok(comparison)
    }

    pub fn baseline(&self) -> &SimulationResults {
        &self.baseline
    }

    pub fn policy(&self) -> &SimulationResults {
        &self.policy
    }

    /// Policy minus baseline for a column, per timestep.
    pub fn difference(&self, name: &str) -> GcrResult<Vec<FloatValue>> {
        let policy = self.policy.values(name)?;
        let baseline = self.baseline.values(name)?;
        if policy.len() != baseline.len() {
            return Err(GcrError::LengthMismatch {
                name: name.to_string(),
                expected: baseline.len(),
                actual: policy.len(),
            });
        }
        Ok(policy.iter().zip(&baseline).map(|(p, b)| p - b).collect())
    }
}
