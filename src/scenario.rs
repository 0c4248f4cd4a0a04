//! A single scenario run
//!
//! The stages run in a fixed order: rebalance the initial stocks, integrate,
//! derive intensity and emissions per timestep, fold reward evaluation and
//! propagation over the timesteps in increasing order, and finally project the
//! atmospheric concentration from the final emissions.

use crate::config::ScenarioConfig;
use crate::results::SimulationResults;
use gcr_components::components::{
    AtmosphericCarbonTracker, CO2eEmissionEstimator, CarbonRewardScheduler,
    EmissionIntensityModel, EmissionRecord, PolicyEffectPropagator, PolicyState,
    PopulationRebalancer, RewardHistory,
};
use gcr_components::parameters::PolicyField;
use gcr_core::errors::{GcrError, GcrResult};
use gcr_core::standard_variables::{
    VAR_ATMOSPHERIC_CO2, VAR_EMISSION_INTENSITY, VAR_GROSS_EMISSIONS, VAR_NATURAL_UPTAKE,
    VAR_NET_EMISSIONS, VAR_XCC_SEQUESTRATION,
};
use gcr_core::timeseries::{FloatValue, TimeAxis};
use gcr_core::timeseries_collection::VariableType;
use std::sync::Arc;
use tracing::{debug, info};

const EMISSIONS_UNIT: &str = "MtCO2e / yr";

#[derive(Debug, Clone)]
pub struct Scenario {
    config: ScenarioConfig,
}

impl Scenario {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn run(&self) -> GcrResult<SimulationResults> {
        let (config, mut diagnostics) = self.config.sanitised();
        let failure = config.failure_policy;
        let policy = config.policy.as_ref();

        let time_axis = Arc::new(TimeAxis::regular(
            config.time.start_time,
            config.time.stop_time,
            config.time.dt,
        )?);
        debug!(
            start = config.time.start_time,
            stop = config.time.stop_time,
            steps = time_axis.len(),
            policy = policy.is_some(),
            "Running scenario"
        );

        let rebalance = PopulationRebalancer::from_parameters(config.rebalance.clone())
            .rebalance(&config.initial_stocks, &mut diagnostics);

        let raw = config.integrator.integrate(&time_axis, &rebalance.stocks)?;
        if raw.time_axis().as_ref() != time_axis.as_ref() {
            return Err(GcrError::InvalidTimeAxis(
                "integrator returned a run on a different time axis".to_string(),
            ));
        }

        let intensity_model =
            EmissionIntensityModel::from_parameters(config.intensity.clone(), time_axis.first());
        let mut estimator = CO2eEmissionEstimator::from_parameters(config.emissions.clone());
        if config.calibrate_emissions {
            estimator = estimator.with_calibration(config.calibration.clone());
        }
        if let Some(policy) = policy {
            estimator = estimator.with_policy(policy.clone());
        }

        let base_intensity = config.intensity.base_intensity;
        let output = raw.industrial_output().values();
        let pollution = raw.pollution_index().values();
        let emissions = time_axis
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let intensity = failure.resolve(
                    VAR_EMISSION_INTENSITY,
                    t,
                    intensity_model.intensity(t, output[i], policy),
                    base_intensity,
                    &mut diagnostics,
                )?;
                failure.resolve(
                    VAR_NET_EMISSIONS,
                    t,
                    estimator.estimate(t, output[i], intensity, pollution[i]),
                    EmissionRecord {
                        emission_intensity: intensity,
                        ..Default::default()
                    },
                    &mut diagnostics,
                )
            })
            .collect::<GcrResult<Vec<_>>>()?;

        let state = PolicyState::from_raw_run(&raw, emissions)?;
        let (state, reward_history) = match policy {
            Some(policy) => {
                let mut scheduler = CarbonRewardScheduler::new(policy.clone(), base_intensity);
                let propagator = PolicyEffectPropagator::from_parameters(policy.clone());

                let state = time_axis
                    .iter()
                    .enumerate()
                    .filter(|&(_, t)| policy.is_active(t))
                    .try_fold(state, |state, (i, t)| {
                        let record = state.emissions()[i];
                        let industrial_output = state
                            .field(PolicyField::IndustrialOutput)
                            .map_or(output[i], |values| values[i]);
                        let reward = failure.resolve(
                            "reward_value",
                            t,
                            scheduler.evaluate(
                                t,
                                record.emission_intensity,
                                record.net_emissions,
                                industrial_output,
                            ),
                            0.0,
                            &mut diagnostics,
                        )?;
                        propagator.propagate(state, i, reward, &estimator, failure, &mut diagnostics)
                    })?;
                (state, scheduler.into_history())
            }
            None => (state, RewardHistory::new()),
        };

        let (fields, emissions) = state.into_parts();
        let net: Vec<FloatValue> = emissions.iter().map(|r| r.net_emissions).collect();
        let projection = AtmosphericCarbonTracker::from_table(config.calibration.clone()).project(
            &time_axis,
            &net,
            failure,
        )?;
        diagnostics.extend(projection.diagnostics);

        let mut table = raw.into_collection();
        for (field, values) in fields {
            if field == PolicyField::EmissionIntensity {
                continue;
            }
            table.upsert_values(field.variable_name(), values, "", VariableType::Exogenous)?;
        }
        let derived: [(&str, &str, Vec<FloatValue>); 6] = [
            (
                VAR_GROSS_EMISSIONS,
                EMISSIONS_UNIT,
                emissions.iter().map(|r| r.gross_emissions).collect(),
            ),
            (
                VAR_NATURAL_UPTAKE,
                EMISSIONS_UNIT,
                emissions.iter().map(|r| r.natural_uptake).collect(),
            ),
            (VAR_NET_EMISSIONS, EMISSIONS_UNIT, net),
            (
                VAR_EMISSION_INTENSITY,
                "MtCO2e / output",
                emissions.iter().map(|r| r.emission_intensity).collect(),
            ),
            (
                VAR_XCC_SEQUESTRATION,
                EMISSIONS_UNIT,
                emissions.iter().map(|r| r.xcc_sequestration).collect(),
            ),
            (VAR_ATMOSPHERIC_CO2, "ppm", projection.values),
        ];
        for (name, unit, values) in derived {
            table.add_values(name, values, unit, VariableType::Endogenous)?;
        }

        info!(
            steps = table.len(),
            rewards = reward_history.len(),
            diagnostics = diagnostics.len(),
            "Scenario complete"
        );
        Ok(SimulationResults::new(
            table,
            reward_history,
            rebalance,
            diagnostics,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcr_core::standard_variables::VAR_INDUSTRIAL_OUTPUT;

    #[test]
    fn baseline_has_no_rewards_or_sequestration() {
        let results = Scenario::new(ScenarioConfig::default()).run().unwrap();
        assert!(results.reward_history().is_empty());
        let seq = results.values(VAR_XCC_SEQUESTRATION).unwrap();
        assert!(seq.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn derived_columns_are_endogenous() {
        let results = Scenario::new(ScenarioConfig::dashboard()).run().unwrap();
        let item = results.table().get_by_name(VAR_NET_EMISSIONS).unwrap();
        assert_eq!(item.variable_type, VariableType::Endogenous);
        let item = results.table().get_by_name(VAR_INDUSTRIAL_OUTPUT).unwrap();
        assert_eq!(item.variable_type, VariableType::Exogenous);
    }
}
