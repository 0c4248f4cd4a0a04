//! CO2-equivalent emissions from industrial output

use crate::historical::HistoricalCO2Table;
use crate::parameters::{EmissionParameters, PolicyConfig};
use gcr_core::errors::{ensure_finite, GcrResult};
use gcr_core::standard_variables::{
    VAR_GROSS_EMISSIONS, VAR_NATURAL_UPTAKE, VAR_NET_EMISSIONS, VAR_XCC_SEQUESTRATION,
};
use gcr_core::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};

/// Derived emissions for one timestep.
///
/// `gross_emissions` already includes the pollution multiplier and any
/// historical calibration, so `net = gross - uptake - sequestration`.
/// unit: MtCO2e / yr (intensity in MtCO2e per unit output)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub gross_emissions: FloatValue,
    pub natural_uptake: FloatValue,
    pub net_emissions: FloatValue,
    pub emission_intensity: FloatValue,
    pub xcc_sequestration: FloatValue,
}

/// Estimates gross, net and sequestered emissions per timestep.
///
/// $$ E = Q I (1 + a P) $$
/// $$ E_{net} = E - u E - s(t) E $$
///
/// Where:
/// - $Q$ is industrial output and $I$ the emission intensity
/// - $P$ is the persistent pollution index
/// - $u$ is the natural uptake rate
/// - $s(t)$ is the ramped sequestration efficiency, zero outside an active policy
///
/// Up to the calibration cutoff $E$ is additionally scaled by the ratio of the
/// nearest measured concentration to the earliest one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CO2eEmissionEstimator {
    parameters: EmissionParameters,
    calibration: Option<HistoricalCO2Table>,
    policy: Option<PolicyConfig>,
}

impl CO2eEmissionEstimator {
    pub fn from_parameters(parameters: EmissionParameters) -> Self {
        Self {
            parameters,
            calibration: None,
            policy: None,
        }
    }

    /// Calibrate early-year emissions against a measured CO2 record.
    pub fn with_calibration(mut self, table: HistoricalCO2Table) -> Self {
        self.calibration = Some(table);
        self
    }

    /// Enable sequestration under a policy scenario.
    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn pollution_multiplier(&self, pollution_index: FloatValue) -> FloatValue {
        1.0 + self.parameters.pollution_coefficient * pollution_index
    }

    /// Calibration scaling at `year`; `1.0` after the cutoff or without a table.
    pub fn calibration_ratio(&self, year: Time) -> FloatValue {
        match &self.calibration {
            Some(table) if year <= table.cutoff_year() => table.calibration_ratio(year),
            _ => 1.0,
        }
    }

    pub fn sequestration(&self, year: Time, total: FloatValue) -> FloatValue {
        match &self.policy {
            Some(policy) if policy.is_active(year) => {
                policy.sequestration_efficiency * policy.ramp(year) * total
            }
            _ => 0.0,
        }
    }

    pub fn estimate(
        &self,
        year: Time,
        output: FloatValue,
        intensity: FloatValue,
        pollution_index: FloatValue,
    ) -> GcrResult<EmissionRecord> {
        let total = output
            * intensity
            * self.pollution_multiplier(pollution_index)
            * self.calibration_ratio(year);
        let total = ensure_finite(VAR_GROSS_EMISSIONS, year, total)?;

        let natural_uptake = ensure_finite(
            VAR_NATURAL_UPTAKE,
            year,
            total * self.parameters.natural_uptake_rate,
        )?;
        let xcc_sequestration =
            ensure_finite(VAR_XCC_SEQUESTRATION, year, self.sequestration(year, total))?;
        let net_emissions = ensure_finite(
            VAR_NET_EMISSIONS,
            year,
            total - natural_uptake - xcc_sequestration,
        )?;

        Ok(EmissionRecord {
            gross_emissions: total,
            natural_uptake,
            net_emissions,
            emission_intensity: intensity,
            xcc_sequestration,
        })
    }
}
