//! Core types for the Global Carbon Reward (GCR) policy layer.
//!
//! This crate holds the pieces shared by every stage of a run: the time axis and
//! timeseries containers, the named per-timestep table, interpolation helpers,
//! error and diagnostic types, and the [`integrator::Integrator`] seam through
//! which the external stock-and-flow model is consumed.

pub mod diagnostics;
pub mod errors;
pub mod integrator;
pub mod interpolate;
pub mod standard_variables;
pub mod timeseries;
pub mod timeseries_collection;
