//! Component parameters
//!
//! One parameter struct per pipeline stage. Every struct deserialises with
//! `#[serde(default)]` so a scenario file only needs to name the values it changes.

mod emissions;
mod intensity;
mod policy;
mod rebalance;

pub use emissions::EmissionParameters;
pub use intensity::IntensityParameters;
pub use policy::{FieldSensitivity, PolicyConfig, PolicyField, PolicySensitivities};
pub use rebalance::{
    CapitalDamping, RebalanceParameters, ARABLE_LAND_DAMPING, INDUSTRIAL_CAPITAL_DAMPING,
    NONRENEWABLE_RESOURCES_DAMPING, PERSISTENT_POLLUTION_DAMPING, SERVICE_CAPITAL_DAMPING,
};
