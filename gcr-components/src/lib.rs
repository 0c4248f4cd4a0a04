//! Components of the Global Carbon Reward policy layer.
//!
//! # Module Organisation
//!
//! - `components`: the pipeline stages, leaf-first (rebalancing, emission
//!   intensity, emissions, rewards, policy propagation, atmospheric CO2)
//! - `parameters`: parameter structs for each stage with documented defaults
//! - `historical`: the measured atmospheric CO2 record used for calibration
//! - `integrators`: in-repo implementations of the integrator seam
//!
//! Each stage is a small struct built with `from_parameters` whose calculations
//! are plain methods, so they can be exercised without running a whole scenario.

pub mod components;
pub mod constants;
pub mod historical;
pub mod integrators;
pub mod parameters;
