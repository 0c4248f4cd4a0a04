//! Fixed conversion constants of the post-cutoff atmospheric projection.
//!
//! These are not configurable; the projection is
//! `ppm = ppm_cutoff + PPM_PER_GTC * (cumulative / MTCO2E_PER_GTC / PROJECTION_MASS_SCALE)`.

use gcr_core::timeseries::FloatValue;

/// Atmospheric concentration increase per unit of carbon mass
/// unit: ppm / GtC
pub const PPM_PER_GTC: FloatValue = 0.47;

/// CO2-equivalent mass per unit of carbon mass
/// unit: MtCO2e / GtC
pub const MTCO2E_PER_GTC: FloatValue = 3667.0;

/// Additional mass scaling applied to cumulative emissions
pub const PROJECTION_MASS_SCALE: FloatValue = 1000.0;
