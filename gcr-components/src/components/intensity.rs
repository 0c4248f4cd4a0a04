//! Emission intensity of industrial output

use crate::parameters::{IntensityParameters, PolicyConfig};
use gcr_core::errors::{ensure_finite, GcrResult};
use gcr_core::standard_variables::VAR_EMISSION_INTENSITY;
use gcr_core::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};

/// Per-timestep emission intensity.
///
/// $$ I(t, Q) = I_0 (1 - r)^{t - t_0} \left(1 + c \ln\frac{Q}{Q_{ref}}\right) (1 - x(t)) $$
///
/// where $x(t)$ is the policy reduction, zero outside an active policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionIntensityModel {
    parameters: IntensityParameters,
    start_time: Time,
}

impl EmissionIntensityModel {
    pub fn from_parameters(parameters: IntensityParameters, start_time: Time) -> Self {
        Self {
            parameters,
            start_time,
        }
    }

    pub fn parameters(&self) -> &IntensityParameters {
        &self.parameters
    }

    /// Output scale factor, neutral (`1.0`) for non-positive or non-finite output.
    pub fn output_scale(&self, output: FloatValue) -> FloatValue {
        let p = &self.parameters;
        if !(output > 0.0) || !output.is_finite() || !(p.output_reference > 0.0) {
            return 1.0;
        }
        1.0 + p.output_log_coefficient * (output / p.output_reference).ln()
    }

    pub fn technology_factor(&self, year: Time) -> FloatValue {
        (1.0 - self.parameters.tech_rate).powf(year - self.start_time)
    }

    /// Policy reduction `(1 - e^{-kΔt}) * min(1, f Δt)`
    pub fn xcc_effect(&self, year: Time, policy: &PolicyConfig) -> FloatValue {
        if !policy.is_active(year) {
            return 0.0;
        }
        let elapsed = policy.years_active(year);
        policy.ramp(year) * (policy.intensity_improvement_factor * elapsed).min(1.0)
    }

    pub fn intensity(
        &self,
        year: Time,
        output: FloatValue,
        policy: Option<&PolicyConfig>,
    ) -> GcrResult<FloatValue> {
        let mut intensity = self.parameters.base_intensity
            * self.technology_factor(year)
            * self.output_scale(output);
        if let Some(policy) = policy {
            intensity *= 1.0 - self.xcc_effect(year, policy);
        }
        ensure_finite(VAR_EMISSION_INTENSITY, year, intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> EmissionIntensityModel {
        EmissionIntensityModel::from_parameters(IntensityParameters::default(), 2025.0)
    }

    #[test]
    fn reference_output_at_start_gives_base_intensity() {
        let intensity = model().intensity(2025.0, 100.0, None).unwrap();
        assert_eq!(intensity, 350.0);
    }

    #[test]
    fn technology_improves_over_time() {
        let m = model();
        assert_relative_eq!(
            m.intensity(2035.0, 100.0, None).unwrap(),
            350.0 * 0.99_f64.powi(10),
            max_relative = 1e-12
        );
    }

    #[test]
    fn non_positive_output_uses_neutral_scale() {
        let m = model();
        assert_eq!(m.output_scale(0.0), 1.0);
        assert_eq!(m.output_scale(-5.0), 1.0);
        assert_eq!(m.output_scale(FloatValue::NAN), 1.0);
        assert_relative_eq!(m.output_scale(100.0 * std::f64::consts::E), 1.1, max_relative = 1e-12);
    }

    #[test]
    fn policy_effect_ramps_in_from_zero() {
        let m = model();
        let policy = PolicyConfig::default();
        assert_eq!(m.xcc_effect(2024.0, &policy), 0.0);
        assert_eq!(m.xcc_effect(2025.0, &policy), 0.0);

        let effect = m.xcc_effect(2035.0, &policy);
        let expected = (1.0 - (-1.0_f64).exp()) * 0.5;
        assert_relative_eq!(effect, expected, max_relative = 1e-12);

        let policy_run = m.intensity(2035.0, 100.0, Some(&policy)).unwrap();
        let baseline = m.intensity(2035.0, 100.0, None).unwrap();
        assert!(policy_run < baseline, "policy should lower intensity");
    }

    #[test]
    fn policy_effect_saturates() {
        let m = model();
        let policy = PolicyConfig::default();
        // improvement term is capped at 1 after 20 years
        let late = m.xcc_effect(2200.0, &policy);
        assert!(late < 1.0);
        assert!(late > 0.99);
    }
}
