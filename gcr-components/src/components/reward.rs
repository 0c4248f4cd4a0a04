//! Carbon reward schedule and the append-only reward log

use crate::parameters::PolicyConfig;
use gcr_core::errors::{ensure_finite, GcrError, GcrResult};
use gcr_core::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One evaluation of the reward at or after the policy start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub year: Time,
    /// unit: $ / tCO2e
    pub reward_value: FloatValue,
    /// Net emissions of the timestep when the reward was evaluated
    /// unit: MtCO2e / yr
    pub emissions: FloatValue,
    pub industrial_output: FloatValue,
}

/// Chronological log of reward evaluations.
///
/// Records can only be appended, in strictly increasing year order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardHistory {
    records: Vec<RewardRecord>,
}

impl RewardHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, rejecting a year that does not follow the last one.
    pub fn push(&mut self, record: RewardRecord) -> GcrResult<()> {
        if let Some(last) = self.records.last() {
            if !(record.year > last.year) {
                return Err(GcrError::RewardOutOfOrder {
                    time: record.year,
                    previous: last.year,
                });
            }
        }
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&RewardRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewardRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[RewardRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a RewardHistory {
    type Item = &'a RewardRecord;
    type IntoIter = std::slice::Iter<'a, RewardRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Computes the reward for each policy year and keeps the reward log.
///
/// $$ R(t) = \min\left(R_0 (1 + g (t - t_s)) \left(1 + \ln\left(1 + \frac{I}{I_0}\right)\right), R_0 m\right) $$
///
/// Rewards are zero before $t_s$. Earlier rewards never feed into later ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonRewardScheduler {
    policy: PolicyConfig,
    base_intensity: FloatValue,
    history: RewardHistory,
}

impl CarbonRewardScheduler {
    pub fn new(policy: PolicyConfig, base_intensity: FloatValue) -> Self {
        Self {
            policy,
            base_intensity,
            history: RewardHistory::new(),
        }
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Log-damped intensity scalar `1 + ln(1 + I / I_0)`
    pub fn intensity_scalar(&self, intensity: FloatValue) -> FloatValue {
        if !(self.base_intensity > 0.0) {
            return 1.0;
        }
        1.0 + (intensity / self.base_intensity).ln_1p()
    }

    /// Reward at `year` given the emission intensity of that timestep.
    ///
    /// Pure; does not touch the reward log.
    pub fn reward_value(&self, year: Time, intensity: FloatValue) -> GcrResult<FloatValue> {
        if !self.policy.is_active(year) {
            return Ok(0.0);
        }
        let p = &self.policy;
        let base = p.initial_reward_value * (1.0 + p.annual_increase_rate * p.years_active(year));
        let reward = (base * self.intensity_scalar(intensity)).min(p.reward_cap());
        ensure_finite("reward_value", year, reward)
    }

    /// Evaluate the reward and log it when the policy is active.
    ///
    /// A year that does not follow the last logged year is rejected before
    /// anything is computed or appended.
    pub fn evaluate(
        &mut self,
        year: Time,
        intensity: FloatValue,
        emissions: FloatValue,
        industrial_output: FloatValue,
    ) -> GcrResult<FloatValue> {
        if !self.policy.is_active(year) {
            return Ok(0.0);
        }
        if let Some(last) = self.history.last() {
            if !(year > last.year) {
                return Err(GcrError::RewardOutOfOrder {
                    time: year,
                    previous: last.year,
                });
            }
        }
        let reward_value = self.reward_value(year, intensity)?;
        debug!(year, reward_value, "Evaluated carbon reward");
        self.history.push(RewardRecord {
            year,
            reward_value,
            emissions,
            industrial_output,
        })?;
        Ok(reward_value)
    }

    pub fn history(&self) -> &RewardHistory {
        &self.history
    }

    pub fn into_history(self) -> RewardHistory {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use is_close::is_close;

    fn scheduler() -> CarbonRewardScheduler {
        CarbonRewardScheduler::new(PolicyConfig::default(), 350.0)
    }

    // ===== Reward value =====

    #[test]
    fn zero_before_policy_start() {
        let s = scheduler();
        assert_eq!(s.reward_value(2024.5, 350.0).unwrap(), 0.0);
        assert_eq!(s.reward_value(1900.0, 1e6).unwrap(), 0.0);
    }

    #[test]
    fn first_policy_year_is_initial_value_times_scalar() {
        let s = scheduler();
        let reward = s.reward_value(2025.0, 350.0).unwrap();
        assert_relative_eq!(reward, 100.0 * (1.0 + 2.0_f64.ln()), max_relative = 1e-12);
    }

    #[test]
    fn reward_grows_linearly_in_base() {
        let s = scheduler();
        let scalar = s.intensity_scalar(0.0);
        assert_eq!(scalar, 1.0);
        assert!(is_close!(s.reward_value(2035.0, 0.0).unwrap(), 150.0));
    }

    #[test]
    fn reward_is_capped() {
        let s = scheduler();
        for year in [2025.0, 2100.0, 2500.0, 10_000.0] {
            for intensity in [0.0, 350.0, 1e9] {
                let reward = s.reward_value(year, intensity).unwrap();
                assert!(reward <= 500.0, "{reward} at {year} exceeds the cap");
            }
        }
        assert_eq!(s.reward_value(10_000.0, 350.0).unwrap(), 500.0);
    }

    #[test]
    fn zero_base_intensity_uses_neutral_scalar() {
        let s = CarbonRewardScheduler::new(PolicyConfig::default(), 0.0);
        assert_eq!(s.intensity_scalar(100.0), 1.0);
    }

    // ===== History =====

    #[test]
    fn history_records_only_policy_years() {
        let mut s = scheduler();
        for year in [2024.0, 2024.5, 2025.0, 2025.5, 2026.0] {
            s.evaluate(year, 350.0, 10.0, 100.0).unwrap();
        }
        let years: Vec<_> = s.history().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2025.0, 2025.5, 2026.0]);
        assert_eq!(s.history().last().unwrap().emissions, 10.0);
    }

    #[test]
    fn repeated_or_out_of_order_year_is_rejected() {
        let mut s = scheduler();
        s.evaluate(2030.0, 350.0, 10.0, 100.0).unwrap();

        let repeated = s.evaluate(2030.0, 350.0, 10.0, 100.0);
        assert!(matches!(repeated, Err(GcrError::RewardOutOfOrder { .. })));
        let earlier = s.evaluate(2026.0, 350.0, 10.0, 100.0);
        assert!(earlier.is_err());
        assert_eq!(s.history().len(), 1, "nothing appended on rejection");
    }

    #[test]
    fn history_serialises_as_list() {
        let mut history = RewardHistory::new();
        history
            .push(RewardRecord {
                year: 2025.0,
                reward_value: 100.0,
                emissions: 1.0,
                industrial_output: 2.0,
            })
            .unwrap();
        let json = serde_json::to_value(&history).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["reward_value"], 100.0);
    }
}
