//! Carbon reward policy parameters
//!
//! A single [`PolicyConfig`] drives the policy-dependent parts of a run: the
//! intensity improvement, sequestration, the reward schedule and the
//! propagation of reward effects into the downstream series.

use gcr_core::standard_variables::{
    VAR_EMISSION_INTENSITY, VAR_FOOD_PER_CAPITA, VAR_INDUSTRIAL_OUTPUT, VAR_LIFE_EXPECTANCY,
    VAR_POLLUTION_INDEX, VAR_SERVICE_OUTPUT_PER_CAPITA,
};
use gcr_core::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};

/// A series that the policy reward acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyField {
    IndustrialOutput,
    PollutionIndex,
    FoodPerCapita,
    ServiceOutputPerCapita,
    EmissionIntensity,
    LifeExpectancy,
}

impl PolicyField {
    pub const ALL: [PolicyField; 6] = [
        PolicyField::IndustrialOutput,
        PolicyField::PollutionIndex,
        PolicyField::FoodPerCapita,
        PolicyField::ServiceOutputPerCapita,
        PolicyField::EmissionIntensity,
        PolicyField::LifeExpectancy,
    ];

    /// Column name of the field in the per-timestep table
    pub fn variable_name(&self) -> &'static str {
        match self {
            PolicyField::IndustrialOutput => VAR_INDUSTRIAL_OUTPUT,
            PolicyField::PollutionIndex => VAR_POLLUTION_INDEX,
            PolicyField::FoodPerCapita => VAR_FOOD_PER_CAPITA,
            PolicyField::ServiceOutputPerCapita => VAR_SERVICE_OUTPUT_PER_CAPITA,
            PolicyField::EmissionIntensity => VAR_EMISSION_INTENSITY,
            PolicyField::LifeExpectancy => VAR_LIFE_EXPECTANCY,
        }
    }
}

/// Response of one field to the policy reward.
///
/// The field's modifier is `max(floor, 1 - sensitivity * effect * ramp)`.
/// A negative sensitivity makes the policy raise the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSensitivity {
    pub sensitivity: FloatValue,
    pub floor: FloatValue,
}

impl FieldSensitivity {
    pub const fn new(sensitivity: FloatValue, floor: FloatValue) -> Self {
        Self { sensitivity, floor }
    }
}

/// Per-field sensitivities and floors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySensitivities {
    /// default: sensitivity 0.08, floor 0.85
    pub industrial_output: FieldSensitivity,
    /// default: sensitivity 0.12, floor 0.5
    pub pollution_index: FieldSensitivity,
    /// default: sensitivity 0.05, floor 0.9
    pub food_per_capita: FieldSensitivity,
    /// default: sensitivity 0.07, floor 0.9
    pub service_output_per_capita: FieldSensitivity,
    /// default: sensitivity 0.1, floor 0.5
    pub emission_intensity: FieldSensitivity,
    /// default: sensitivity -0.02, floor 0.95
    pub life_expectancy: FieldSensitivity,
}

impl Default for PolicySensitivities {
    fn default() -> Self {
        Self {
            industrial_output: FieldSensitivity::new(0.08, 0.85),
            pollution_index: FieldSensitivity::new(0.12, 0.5),
            food_per_capita: FieldSensitivity::new(0.05, 0.9),
            service_output_per_capita: FieldSensitivity::new(0.07, 0.9),
            emission_intensity: FieldSensitivity::new(0.1, 0.5),
            life_expectancy: FieldSensitivity::new(-0.02, 0.95),
        }
    }
}

impl PolicySensitivities {
    pub fn get(&self, field: PolicyField) -> FieldSensitivity {
        match field {
            PolicyField::IndustrialOutput => self.industrial_output,
            PolicyField::PollutionIndex => self.pollution_index,
            PolicyField::FoodPerCapita => self.food_per_capita,
            PolicyField::ServiceOutputPerCapita => self.service_output_per_capita,
            PolicyField::EmissionIntensity => self.emission_intensity,
            PolicyField::LifeExpectancy => self.life_expectancy,
        }
    }
}

/// Parameters of a Global Carbon Reward policy scenario.
///
/// Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Year the reward takes effect
    /// unit: yr
    /// default: 2025.0
    pub reward_start_year: Time,

    /// Reward value in the first policy year
    /// unit: $ / tCO2e
    /// default: 100.0
    pub initial_reward_value: FloatValue,

    /// Linear annual increase of the base reward
    /// unit: 1 / yr
    /// default: 0.05
    pub annual_increase_rate: FloatValue,

    /// Rate at which the policy intensity reduction saturates
    /// unit: 1 / yr
    /// default: 0.05
    pub intensity_improvement_factor: FloatValue,

    /// Fraction of total emissions sequestered once the policy is fully ramped in
    /// default: 0.1
    pub sequestration_efficiency: FloatValue,

    /// Cap on the reward as a multiple of the initial reward value
    /// default: 5.0
    pub reward_cap_multiplier: FloatValue,

    /// Length of the window a year's reward acts over
    /// unit: yr
    /// default: 5.0
    pub propagation_window_length: Time,

    /// Rate `k` of the smooth policy ramp `1 - exp(-k (t - t_start))`
    /// unit: 1 / yr
    /// default: 0.1
    pub ramp_rate: FloatValue,

    /// Rate `λ` of the exponential decay of a modifier across its window
    /// unit: 1 / yr
    /// default: 0.3
    pub window_decay_rate: FloatValue,

    /// Weight given to the corrected value when blending with the prior value
    /// default: 0.5
    pub blend_weight: FloatValue,

    pub sensitivities: PolicySensitivities,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            reward_start_year: 2025.0,
            initial_reward_value: 100.0,
            annual_increase_rate: 0.05,
            intensity_improvement_factor: 0.05,
            sequestration_efficiency: 0.1,
            reward_cap_multiplier: 5.0,
            propagation_window_length: 5.0,
            ramp_rate: 0.1,
            window_decay_rate: 0.3,
            blend_weight: 0.5,
            sensitivities: PolicySensitivities::default(),
        }
    }
}

impl PolicyConfig {
    pub fn is_active(&self, year: Time) -> bool {
        year >= self.reward_start_year
    }

    /// Years elapsed since the policy started (zero before the start).
    pub fn years_active(&self, year: Time) -> Time {
        (year - self.reward_start_year).max(0.0)
    }

    /// Smooth policy ramp `1 - exp(-k Δt)`, in `[0, 1)`.
    pub fn ramp(&self, year: Time) -> FloatValue {
        if !self.is_active(year) {
            return 0.0;
        }
        1.0 - (-self.ramp_rate * self.years_active(year)).exp()
    }

    /// Upper bound on any reward value
    pub fn reward_cap(&self) -> FloatValue {
        self.initial_reward_value * self.reward_cap_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_is_zero_at_start_and_saturates() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.ramp(2020.0), 0.0);
        assert_eq!(policy.ramp(2025.0), 0.0);
        assert!(policy.ramp(2030.0) > 0.0);
        assert!(policy.ramp(2500.0) <= 1.0);
        assert!(policy.ramp(2035.0) > policy.ramp(2030.0));
    }

    #[test]
    fn default_sensitivities() {
        let sensitivities = PolicySensitivities::default();
        assert_eq!(
            sensitivities.get(PolicyField::IndustrialOutput).sensitivity,
            0.08
        );
        assert_eq!(sensitivities.get(PolicyField::PollutionIndex).sensitivity, 0.12);
        assert_eq!(sensitivities.get(PolicyField::FoodPerCapita).sensitivity, 0.05);
        assert_eq!(
            sensitivities
                .get(PolicyField::ServiceOutputPerCapita)
                .sensitivity,
            0.07
        );
    }

    #[test]
    fn partial_config_fills_defaults() {
        let policy: PolicyConfig =
            serde_json::from_str(r#"{"reward_start_year": 2040.0, "blend_weight": 0.25}"#).unwrap();
        assert_eq!(policy.reward_start_year, 2040.0);
        assert_eq!(policy.blend_weight, 0.25);
        assert_eq!(policy.initial_reward_value, 100.0);
        assert_eq!(policy.sensitivities, PolicySensitivities::default());
    }

    #[test]
    fn field_names_match_table_columns() {
        assert_eq!(PolicyField::IndustrialOutput.variable_name(), "industrial_output");
        assert_eq!(
            PolicyField::PollutionIndex.variable_name(),
            "persistent_pollution_index"
        );
        assert_eq!(PolicyField::EmissionIntensity.variable_name(), "emission_intensity");
    }
}
