//! Emission intensity parameters

use gcr_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the emission intensity of industrial output.
///
/// $$ I(t, Q) = I_0 (1 - r)^{t - t_0} \left(1 + c \ln\frac{Q}{Q_{ref}}\right) $$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityParameters {
    /// Emission intensity at the start of the run for reference output
    /// unit: MtCO2e per unit of industrial output
    /// default: 350.0
    pub base_intensity: FloatValue,

    /// Annual rate of technological intensity improvement
    /// unit: 1 / yr
    /// default: 0.01
    pub tech_rate: FloatValue,

    /// Output at which the scale factor is neutral
    /// default: 100.0
    pub output_reference: FloatValue,

    /// Coefficient on the logarithm of relative output
    /// default: 0.1
    pub output_log_coefficient: FloatValue,
}

impl Default for IntensityParameters {
    fn default() -> Self {
        Self {
            base_intensity: 350.0,
            tech_rate: 0.01,
            output_reference: 100.0,
            output_log_coefficient: 0.1,
        }
    }
}
