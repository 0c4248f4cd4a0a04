//! Pipeline stages of a run, leaf-first.

mod atmosphere;
mod emissions;
mod intensity;
mod propagation;
mod rebalance;
mod reward;

pub use atmosphere::{AtmosphericCarbonTracker, AtmosphericProjection};
pub use emissions::{CO2eEmissionEstimator, EmissionRecord};
pub use intensity::EmissionIntensityModel;
pub use propagation::{PolicyEffectPropagator, PolicyState};
pub use rebalance::{PopulationRebalancer, RebalanceOutcome};
pub use reward::{CarbonRewardScheduler, RewardHistory, RewardRecord};
