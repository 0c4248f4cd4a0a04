//! CO2e emission parameters

use gcr_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionParameters {
    /// Increase in emissions per unit of persistent pollution index
    /// default: 0.2
    pub pollution_coefficient: FloatValue,

    /// Fraction of emissions removed by natural sinks each year
    /// unit: 1 / yr
    /// default: 0.0167
    pub natural_uptake_rate: FloatValue,
}

impl Default for EmissionParameters {
    fn default() -> Self {
        Self {
            pollution_coefficient: 0.2,
            natural_uptake_rate: 0.0167,
        }
    }
}
