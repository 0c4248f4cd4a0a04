//! Propagation of reward effects into the downstream series
//!
//! Each policy year's reward is turned into a multiplicative modifier per field
//! which is blended into the series over a bounded, decaying window of future
//! timesteps. Years are folded in increasing order, each one reading the series
//! as already modified by all earlier years.

use crate::components::emissions::{CO2eEmissionEstimator, EmissionRecord};
use crate::parameters::{PolicyConfig, PolicyField};
use gcr_core::diagnostics::{Diagnostic, FailurePolicy};
use gcr_core::errors::{ensure_finite, GcrError, GcrResult};
use gcr_core::integrator::RawRun;
use gcr_core::timeseries::{FloatValue, Time, TimeAxis};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// The working table threaded through the propagation fold.
///
/// Holds the policy-affected fields present in the run and the emission record
/// of every timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyState {
    time_axis: Arc<TimeAxis>,
    fields: BTreeMap<PolicyField, Vec<FloatValue>>,
    emissions: Vec<EmissionRecord>,
}

impl PolicyState {
    pub fn new(
        time_axis: Arc<TimeAxis>,
        fields: BTreeMap<PolicyField, Vec<FloatValue>>,
        emissions: Vec<EmissionRecord>,
    ) -> GcrResult<Self> {
        let n = time_axis.len();
        if emissions.len() != n {
            return Err(GcrError::LengthMismatch {
                name: "emissions".to_string(),
                expected: n,
                actual: emissions.len(),
            });
        }
        if let Some((field, values)) = fields.iter().find(|(_, v)| v.len() != n) {
            return Err(GcrError::LengthMismatch {
                name: field.variable_name().to_string(),
                expected: n,
                actual: values.len(),
            });
        }
        Ok(Self {
            time_axis,
            fields,
            emissions,
        })
    }

    /// Seed the state from a raw run and its initial emission records.
    ///
    /// Emission intensity is taken from the records. Optional fields missing from
    /// the run are left out and never propagated.
    pub fn from_raw_run(raw: &RawRun, emissions: Vec<EmissionRecord>) -> GcrResult<Self> {
        let mut fields = BTreeMap::new();
        for field in PolicyField::ALL {
            if field == PolicyField::EmissionIntensity {
                continue;
            }
            if let Some(ts) = raw.optional(field.variable_name()) {
                fields.insert(field, ts.values().to_vec());
            }
        }
        fields.insert(
            PolicyField::EmissionIntensity,
            emissions.iter().map(|r| r.emission_intensity).collect(),
        );
        Self::new(raw.time_axis().clone(), fields, emissions)
    }

    pub fn time_axis(&self) -> &Arc<TimeAxis> {
        &self.time_axis
    }

    pub fn field(&self, field: PolicyField) -> Option<&[FloatValue]> {
        self.fields.get(&field).map(|v| v.as_slice())
    }

    pub fn emissions(&self) -> &[EmissionRecord] {
        &self.emissions
    }

    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<PolicyField, Vec<FloatValue>>,
        Vec<EmissionRecord>,
    ) {
        (self.fields, self.emissions)
    }

    fn value(&self, field: PolicyField, index: usize) -> Option<FloatValue> {
        self.fields.get(&field).and_then(|v| v.get(index).copied())
    }
}

/// Applies reward-driven modifiers across the propagation window.
///
/// $$ m_f = \max(floor_f, 1 - s_f \tanh(0.5 R / R_0) (1 - e^{-k (t - t_s)})) $$
/// $$ x' = x (1 - b) + x m_f^{e^{-\lambda \Delta}} b $$
///
/// for each timestep in $[t, t + W)$ with offset $\Delta$.
#[derive(Debug, Clone)]
pub struct PolicyEffectPropagator {
    policy: PolicyConfig,
}

impl PolicyEffectPropagator {
    pub fn from_parameters(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    pub fn effect_strength(&self, reward: FloatValue) -> FloatValue {
        if !(self.policy.initial_reward_value > 0.0) {
            return 0.0;
        }
        (0.5 * reward / self.policy.initial_reward_value).tanh()
    }

    pub fn policy_strength(&self, year: Time) -> FloatValue {
        self.policy.ramp(year)
    }

    pub fn modifier(&self, field: PolicyField, reward: FloatValue, year: Time) -> FloatValue {
        let s = self.policy.sensitivities.get(field);
        let raw = 1.0 - s.sensitivity * self.effect_strength(reward) * self.policy_strength(year);
        raw.max(s.floor)
    }

    pub fn window_weight(&self, offset: Time) -> FloatValue {
        (-self.policy.window_decay_rate * offset).exp()
    }

    pub fn blend(&self, old: FloatValue, modifier: FloatValue, weight: FloatValue) -> FloatValue {
        let b = self.policy.blend_weight;
        old * (1.0 - b) + old * modifier.powf(weight) * b
    }

    /// Indices of the timesteps in `[year, year + W)` starting at `index`.
    pub fn window(&self, time_axis: &TimeAxis, index: usize) -> std::ops::Range<usize> {
        let Some(year) = time_axis.at(index) else {
            return index..index;
        };
        let end = year + self.policy.propagation_window_length;
        let stop = (index..time_axis.len())
            .find(|&j| time_axis.at(j).map_or(true, |t| t >= end))
            .unwrap_or(time_axis.len());
        index..stop
    }

    /// Apply the effect of the reward evaluated at timestep `index`.
    ///
    /// The emission record of every timestep in the window is re-derived from the
    /// updated output, intensity and pollution index.
    pub fn propagate(
        &self,
        mut state: PolicyState,
        index: usize,
        reward: FloatValue,
        estimator: &CO2eEmissionEstimator,
        failure: FailurePolicy,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> GcrResult<PolicyState> {
        let Some(year) = state.time_axis.at(index) else {
            return Ok(state);
        };
        if reward == 0.0 || !self.policy.is_active(year) {
            return Ok(state);
        }

        let modifiers: Vec<(PolicyField, FloatValue)> = state
            .fields
            .keys()
            .map(|&field| (field, self.modifier(field, reward, year)))
            .collect();
        let window = self.window(&state.time_axis, index);
        debug!(year, reward, window_len = window.len(), "Propagating policy effects");

        for j in window {
            let t = state.time_axis.at(j).unwrap_or(year);
            let weight = self.window_weight(t - year);

            for &(field, modifier) in &modifiers {
                let Some(values) = state.fields.get_mut(&field) else {
                    continue;
                };
                let old = values[j];
                let new = failure.resolve(
                    field.variable_name(),
                    t,
                    ensure_finite(field.variable_name(), t, self.blend(old, modifier, weight)),
                    old,
                    diagnostics,
                )?;
                values[j] = new;
            }

            let rederived = match (
                state.value(PolicyField::IndustrialOutput, j),
                state.value(PolicyField::EmissionIntensity, j),
                state.value(PolicyField::PollutionIndex, j),
            ) {
                (Some(output), Some(intensity), Some(pollution)) => {
                    estimator.estimate(t, output, intensity, pollution)
                }
                _ => Err(GcrError::Error(format!(
                    "propagation state at {t} lacks output, intensity or pollution"
                ))),
            };
            let previous = state.emissions[j];
            state.emissions[j] =
                failure.resolve("emissions", t, rederived, previous, diagnostics)?;
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::EmissionParameters;
    use approx::assert_relative_eq;
    use gcr_core::standard_variables::{
        VAR_INDUSTRIAL_OUTPUT, VAR_LIFE_EXPECTANCY, VAR_POLLUTION_INDEX, VAR_POPULATION,
    };

    fn axis() -> Arc<TimeAxis> {
        Arc::new(TimeAxis::regular(2025.0, 2040.0, 1.0).unwrap())
    }

    fn state(estimator: &CO2eEmissionEstimator) -> PolicyState {
        let axis = axis();
        let n = axis.len();
        let raw = RawRun::from_columns(
            axis.clone(),
            [
                (VAR_POPULATION, vec![8000.0; n]),
                (VAR_INDUSTRIAL_OUTPUT, vec![100.0; n]),
                (VAR_POLLUTION_INDEX, vec![1.0; n]),
                (VAR_LIFE_EXPECTANCY, vec![70.0; n]),
            ],
        )
        .unwrap();
        let emissions = axis
            .iter()
            .map(|t| estimator.estimate(t, 100.0, 2.0, 1.0).unwrap())
            .collect();
        PolicyState::from_raw_run(&raw, emissions).unwrap()
    }

    fn setup() -> (PolicyEffectPropagator, CO2eEmissionEstimator) {
        let policy = PolicyConfig::default();
        let estimator = CO2eEmissionEstimator::from_parameters(EmissionParameters::default())
            .with_policy(policy.clone());
        (PolicyEffectPropagator::from_parameters(policy), estimator)
    }

    // ===== Modifiers =====

    #[test]
    fn modifier_is_neutral_at_policy_start() {
        let (propagator, _) = setup();
        for field in PolicyField::ALL {
            assert_eq!(propagator.modifier(field, 200.0, 2025.0), 1.0);
        }
    }

    #[test]
    fn modifier_respects_floor() {
        let mut policy = PolicyConfig::default();
        policy.sensitivities.pollution_index.sensitivity = 10.0;
        let propagator = PolicyEffectPropagator::from_parameters(policy);
        assert_eq!(
            propagator.modifier(PolicyField::PollutionIndex, 500.0, 2100.0),
            0.5
        );
    }

    #[test]
    fn life_expectancy_modifier_raises_value() {
        let (propagator, _) = setup();
        assert!(propagator.modifier(PolicyField::LifeExpectancy, 200.0, 2040.0) > 1.0);
        assert!(propagator.modifier(PolicyField::IndustrialOutput, 200.0, 2040.0) < 1.0);
    }

    #[test]
    fn effect_strength_is_tanh() {
        let (propagator, _) = setup();
        assert_relative_eq!(
            propagator.effect_strength(100.0),
            0.5_f64.tanh(),
            max_relative = 1e-12
        );
        assert_eq!(propagator.effect_strength(0.0), 0.0);
    }

    // ===== Window =====

    #[test]
    fn window_is_half_open() {
        let (propagator, _) = setup();
        let axis = axis();
        assert_eq!(propagator.window(&axis, 0), 0..5);
        assert_eq!(propagator.window(&axis, 13), 13..16);
    }

    #[test]
    fn window_on_half_year_steps() {
        let (propagator, _) = setup();
        let axis = TimeAxis::regular(2025.0, 2125.0, 0.5).unwrap();
        assert_eq!(propagator.window(&axis, 0).len(), 10);
    }

    // ===== Propagation =====

    #[test]
    fn zero_reward_is_noop() {
        let (propagator, estimator) = setup();
        let initial = state(&estimator);
        let mut diagnostics = vec![];
        let result = propagator
            .propagate(
                initial.clone(),
                5,
                0.0,
                &estimator,
                FailurePolicy::Fallback,
                &mut diagnostics,
            )
            .unwrap();
        assert_eq!(result, initial);
    }

    #[test]
    fn propagation_touches_only_the_window() {
        let (propagator, estimator) = setup();
        let initial = state(&estimator);
        let mut diagnostics = vec![];
        let result = propagator
            .propagate(
                initial.clone(),
                5,
                200.0,
                &estimator,
                FailurePolicy::Fallback,
                &mut diagnostics,
            )
            .unwrap();

        let before = initial.field(PolicyField::IndustrialOutput).unwrap();
        let after = result.field(PolicyField::IndustrialOutput).unwrap();
        for j in 0..before.len() {
            if (5..10).contains(&j) {
                assert!(after[j] < before[j], "output at {j} should be reduced");
            } else {
                assert_eq!(after[j], before[j], "output at {j} should be untouched");
            }
        }
        // decaying weight: the modifier bites hardest at the start of the window
        assert!(after[5] < after[9]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn emissions_are_rederived_in_window() {
        let (propagator, estimator) = setup();
        let initial = state(&estimator);
        let mut diagnostics = vec![];
        let result = propagator
            .propagate(
                initial.clone(),
                5,
                200.0,
                &estimator,
                FailurePolicy::Fallback,
                &mut diagnostics,
            )
            .unwrap();

        let j = 6;
        let output = result.field(PolicyField::IndustrialOutput).unwrap()[j];
        let intensity = result.field(PolicyField::EmissionIntensity).unwrap()[j];
        let pollution = result.field(PolicyField::PollutionIndex).unwrap()[j];
        let expected = estimator
            .estimate(2031.0, output, intensity, pollution)
            .unwrap();
        assert_eq!(result.emissions()[j], expected);
        assert!(result.emissions()[j].net_emissions < initial.emissions()[j].net_emissions);
        assert_eq!(result.emissions()[11], initial.emissions()[11]);
    }

    #[test]
    fn absent_fields_are_skipped() {
        let (_, estimator) = setup();
        let state = state(&estimator);
        assert!(state.field(PolicyField::FoodPerCapita).is_none());
        assert!(state.field(PolicyField::LifeExpectancy).is_some());
    }

    #[test]
    fn overlapping_windows_compound() {
        let (propagator, estimator) = setup();
        let mut diagnostics = vec![];
        let once = propagator
            .propagate(
                state(&estimator),
                5,
                200.0,
                &estimator,
                FailurePolicy::Fallback,
                &mut diagnostics,
            )
            .unwrap();
        let twice = propagator
            .propagate(
                once.clone(),
                6,
                200.0,
                &estimator,
                FailurePolicy::Fallback,
                &mut diagnostics,
            )
            .unwrap();
        let a = once.field(PolicyField::IndustrialOutput).unwrap();
        let b = twice.field(PolicyField::IndustrialOutput).unwrap();
        assert_eq!(a[5], b[5]);
        assert!(b[7] < a[7]);
    }

    /// `old (1 - b) + old m^(e^{-λΔ}) b` with the default policy constants.
    fn blended(
        old: FloatValue,
        sensitivity: FloatValue,
        floor: FloatValue,
        reward: FloatValue,
        year: Time,
        t: Time,
    ) -> FloatValue {
        let ramp = 1.0 - (-0.1 * (year - 2025.0)).exp();
        let m = (1.0 - sensitivity * (0.5 * reward / 100.0).tanh() * ramp).max(floor);
        let weight = (-0.3 * (t - year)).exp();
        old * 0.5 + old * m.powf(weight) * 0.5
    }

    #[test]
    fn consecutive_years_fold_over_modified_series() {
        let (propagator, estimator) = setup();
        let mut diagnostics = vec![];
        let initial = state(&estimator);
        let first = propagator
            .propagate(
                initial.clone(),
                4,
                200.0,
                &estimator,
                FailurePolicy::Fallback,
                &mut diagnostics,
            )
            .unwrap();
        let second = propagator
            .propagate(
                first.clone(),
                5,
                220.0,
                &estimator,
                FailurePolicy::Fallback,
                &mut diagnostics,
            )
            .unwrap();

        let original = initial.field(PolicyField::IndustrialOutput).unwrap();
        let once = first.field(PolicyField::IndustrialOutput).unwrap();
        let twice = second.field(PolicyField::IndustrialOutput).unwrap();
        for j in 4..9 {
            let t = 2025.0 + j as FloatValue;
            assert_relative_eq!(
                once[j],
                blended(original[j], 0.08, 0.85, 200.0, 2029.0, t),
                max_relative = 1e-12
            );
        }
        for j in 5..10 {
            let t = 2025.0 + j as FloatValue;
            assert_relative_eq!(
                twice[j],
                blended(once[j], 0.08, 0.85, 220.0, 2030.0, t),
                max_relative = 1e-12
            );
        }
        assert_eq!(twice[4], once[4]);
        assert_eq!(twice[10], original[10]);

        let pollution = first.field(PolicyField::PollutionIndex).unwrap();
        assert_relative_eq!(
            second.field(PolicyField::PollutionIndex).unwrap()[7],
            blended(pollution[7], 0.12, 0.5, 220.0, 2030.0, 2032.0),
            max_relative = 1e-12
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn non_finite_values_fall_back_with_diagnostic() {
        let (propagator, estimator) = setup();
        let mut initial = state(&estimator);
        initial
            .fields
            .insert(PolicyField::FoodPerCapita, vec![FloatValue::INFINITY; 16]);

        let mut diagnostics = vec![];
        let result = propagator
            .propagate(
                initial,
                5,
                200.0,
                &estimator,
                FailurePolicy::Fallback,
                &mut diagnostics,
            )
            .unwrap();
        assert_eq!(diagnostics.len(), 5);
        assert!(result.field(PolicyField::FoodPerCapita).unwrap()[5].is_infinite());

        let mut initial = state(&estimator);
        initial
            .fields
            .insert(PolicyField::FoodPerCapita, vec![FloatValue::INFINITY; 16]);
        let aborted = propagator.propagate(
            initial,
            5,
            200.0,
            &estimator,
            FailurePolicy::Abort,
            &mut vec![],
        );
        assert!(aborted.is_err());
    }
}
