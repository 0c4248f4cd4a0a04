//! Population rebalancing parameters

use gcr_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

pub const INDUSTRIAL_CAPITAL_DAMPING: FloatValue = 0.9;
pub const ARABLE_LAND_DAMPING: FloatValue = 0.95;
pub const SERVICE_CAPITAL_DAMPING: FloatValue = 0.85;
pub const NONRENEWABLE_RESOURCES_DAMPING: FloatValue = 0.8;
pub const PERSISTENT_POLLUTION_DAMPING: FloatValue = 0.7;

/// Damping applied on top of the population scaling factor for capital-like stocks.
///
/// Capital-intensive stocks adjust more slowly than headcount, so each is scaled by
/// `factor * damping` rather than by `factor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalDamping {
    /// default: 0.9
    pub industrial_capital: FloatValue,
    /// default: 0.95
    pub arable_land: FloatValue,
    /// default: 0.85
    pub service_capital: FloatValue,
    /// default: 0.8
    pub nonrenewable_resources: FloatValue,
    /// default: 0.7
    pub persistent_pollution: FloatValue,
}

impl Default for CapitalDamping {
    fn default() -> Self {
        Self {
            industrial_capital: INDUSTRIAL_CAPITAL_DAMPING,
            arable_land: ARABLE_LAND_DAMPING,
            service_capital: SERVICE_CAPITAL_DAMPING,
            nonrenewable_resources: NONRENEWABLE_RESOURCES_DAMPING,
            persistent_pollution: PERSISTENT_POLLUTION_DAMPING,
        }
    }
}

/// Parameters for rebalancing the initial population to a target total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceParameters {
    /// Target total population across the four cohorts.
    ///
    /// `None` or `0` leaves the initial stocks untouched.
    /// unit: million
    /// default: None
    pub target_population: Option<FloatValue>,

    pub damping: CapitalDamping,
}
