//! Global Carbon Reward (GCR) policy feedback and atmospheric carbon accounting.
//!
//! Runs a carbon-reward policy layer over the output of an external
//! stock-and-flow world model. A run rebalances the initial population, takes the
//! integrator's per-timestep table, derives emissions, evaluates the carbon
//! reward, propagates its effects forward over a decaying window and finally
//! projects atmospheric CO2.
//!
//! The building blocks live in [`gcr_core`] (timeseries, errors, the integrator
//! seam) and [`gcr_components`] (the pipeline stages). This crate wires them into
//! scenarios:
//!
//! ```no_run
//! use gcr::{ScenarioComparison, ScenarioConfig};
//!
//! let comparison = ScenarioComparison::run(&ScenarioConfig::dashboard())?;
//! let extra_ppm = comparison.difference("atmospheric_co2")?;
//! # Ok::<(), gcr::gcr_core::errors::GcrError>(())
//! ```

pub mod cache;
pub mod comparison;
pub mod config;
pub mod results;
pub mod scenario;

pub use cache::ResultsCache;
pub use comparison::ScenarioComparison;
pub use config::{ScenarioConfig, TimeConfig};
pub use results::{ResultRecord, SimulationResults};
pub use scenario::Scenario;

pub use gcr_components;
pub use gcr_core;
