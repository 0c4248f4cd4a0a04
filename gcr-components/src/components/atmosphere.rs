//! Atmospheric CO2 concentration
//!
//! Up to the calibration cutoff the concentration follows the measured record.
//! After it, the concentration at the cutoff is driven forward by cumulative net
//! emissions. The projection is a pure function of the final emissions series.

use crate::constants::{MTCO2E_PER_GTC, PPM_PER_GTC, PROJECTION_MASS_SCALE};
use crate::historical::HistoricalCO2Table;
use gcr_core::diagnostics::{Diagnostic, FailurePolicy};
use gcr_core::errors::{ensure_finite, GcrError, GcrResult};
use gcr_core::standard_variables::{VAR_ATMOSPHERIC_CO2, VAR_NET_EMISSIONS};
use gcr_core::timeseries::{FloatValue, Time, TimeAxis};
use serde::{Deserialize, Serialize};

/// A projected ppm series with the fallbacks taken while building it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphericProjection {
    pub values: Vec<FloatValue>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtmosphericCarbonTracker {
    table: HistoricalCO2Table,
}

impl AtmosphericCarbonTracker {
    pub fn from_table(table: HistoricalCO2Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &HistoricalCO2Table {
        &self.table
    }

    /// Measured concentration at or before the cutoff.
    pub fn historical_ppm(&self, year: Time) -> GcrResult<FloatValue> {
        self.table.ppm_at(year)
    }

    /// Concentration after the cutoff for a cumulative net emission total.
    ///
    /// `cumulative` is in MtCO2e.
    pub fn ppm_from_cumulative(&self, cutoff_ppm: FloatValue, cumulative: FloatValue) -> FloatValue {
        cutoff_ppm + PPM_PER_GTC * (cumulative / MTCO2E_PER_GTC / PROJECTION_MASS_SCALE)
    }

    /// Project concentrations over `time_axis` from final net emissions.
    ///
    /// The cutoff year itself reports its anchor exactly, but its net emissions
    /// open the cumulative total. Years before the first anchor fall back to the
    /// earliest anchor value under [`FailurePolicy::Fallback`]. Non-finite net
    /// emissions contribute nothing to the cumulative total.
    pub fn project(
        &self,
        time_axis: &TimeAxis,
        net_emissions: &[FloatValue],
        failure: FailurePolicy,
    ) -> GcrResult<AtmosphericProjection> {
        if net_emissions.len() != time_axis.len() {
            return Err(GcrError::LengthMismatch {
                name: VAR_NET_EMISSIONS.to_string(),
                expected: time_axis.len(),
                actual: net_emissions.len(),
            });
        }

        let cutoff = self.table.cutoff_year();
        let cutoff_ppm = self.table.ppm_at(cutoff)?;
        let (_, earliest_ppm) = self.table.earliest();
        let dt = time_axis.step().unwrap_or(1.0);

        let mut diagnostics = vec![];
        let mut values = Vec::with_capacity(time_axis.len());
        let mut cumulative = 0.0;
        let cutoff_index = time_axis.index_of(cutoff);

        for (i, (year, &net)) in time_axis.iter().zip(net_emissions).enumerate() {
            let at_cutoff = cutoff_index == Some(i);
            if year > cutoff || at_cutoff {
                let net = failure.resolve(
                    VAR_NET_EMISSIONS,
                    year,
                    ensure_finite(VAR_NET_EMISSIONS, year, net),
                    0.0,
                    &mut diagnostics,
                )?;
                cumulative += net * dt;
            }
            let ppm = if year <= cutoff || at_cutoff {
                failure.resolve(
                    VAR_ATMOSPHERIC_CO2,
                    year,
                    self.historical_ppm(year),
                    earliest_ppm,
                    &mut diagnostics,
                )?
            } else {
                self.ppm_from_cumulative(cutoff_ppm, cumulative)
            };
            values.push(ppm);
        }

        Ok(AtmosphericProjection {
            values,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tracker() -> AtmosphericCarbonTracker {
        AtmosphericCarbonTracker::default()
    }

    #[test]
    fn cutoff_year_is_exact_anchor() {
        let axis = TimeAxis::regular(2025.0, 2030.0, 0.5).unwrap();
        let net = vec![1000.0; axis.len()];
        let projection = tracker()
            .project(&axis, &net, FailurePolicy::Fallback)
            .unwrap();
        assert_eq!(projection.values[0], 421.50);
    }

    #[test]
    fn projection_accumulates_net_times_dt() {
        let axis = TimeAxis::regular(2025.0, 2027.0, 0.5).unwrap();
        let net = vec![3667.0; axis.len()];
        let projection = tracker()
            .project(&axis, &net, FailurePolicy::Fallback)
            .unwrap();

        // the cutoff step and each later half-year step add 3667 * 0.5 MtCO2e
        for (i, ppm) in projection.values.iter().enumerate().skip(1) {
            let cumulative = 3667.0 * 0.5 * (i + 1) as FloatValue;
            assert_relative_eq!(
                *ppm,
                421.50 + 0.47 * cumulative / 3667.0 / 1000.0,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn cutoff_year_emissions_reach_the_atmosphere() {
        let axis = TimeAxis::regular(2025.0, 2027.0, 1.0).unwrap();
        let net = vec![3_667_000.0, 0.0, 0.0];
        let projection = tracker()
            .project(&axis, &net, FailurePolicy::Fallback)
            .unwrap();

        // one GtC emitted in the cutoff year
        assert_eq!(projection.values[0], 421.50);
        assert_relative_eq!(projection.values[1], 421.50 + 0.47, max_relative = 1e-12);
        assert_relative_eq!(projection.values[2], 421.50 + 0.47, max_relative = 1e-12);
    }

    #[test]
    fn historical_years_ignore_emissions() {
        let axis = TimeAxis::regular(2000.0, 2025.0, 5.0).unwrap();
        let a = tracker()
            .project(&axis, &vec![0.0; axis.len()], FailurePolicy::Fallback)
            .unwrap();
        let b = tracker()
            .project(&axis, &vec![1e9; axis.len()], FailurePolicy::Fallback)
            .unwrap();
        assert_eq!(a.values, b.values);
        assert_eq!(a.values[0], 369.71);
    }

    #[test]
    fn years_before_record_fall_back_to_earliest() {
        let axis = TimeAxis::regular(1840.0, 1850.0, 5.0).unwrap();
        let projection = tracker()
            .project(&axis, &vec![0.0; axis.len()], FailurePolicy::Fallback)
            .unwrap();
        assert_eq!(projection.values, vec![285.2, 285.2, 285.2]);
        assert_eq!(projection.diagnostics.len(), 2);

        let aborted = tracker().project(&axis, &vec![0.0; axis.len()], FailurePolicy::Abort);
        assert!(aborted.is_err());
    }

    #[test]
    fn projection_is_repeatable() {
        let axis = TimeAxis::regular(2020.0, 2060.0, 0.5).unwrap();
        let net: Vec<_> = (0..axis.len()).map(|i| 30_000.0 - 100.0 * i as f64).collect();
        let first = tracker()
            .project(&axis, &net, FailurePolicy::Fallback)
            .unwrap();
        let second = tracker()
            .project(&axis, &net, FailurePolicy::Fallback)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let axis = TimeAxis::regular(2025.0, 2030.0, 1.0).unwrap();
        assert!(tracker()
            .project(&axis, &[1.0, 2.0], FailurePolicy::Fallback)
            .is_err());
    }
}
