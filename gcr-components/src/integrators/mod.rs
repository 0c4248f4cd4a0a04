//! In-repo implementations of the integrator seam.
//!
//! Neither reimplements the external stock-and-flow model. [`TabulatedIntegrator`]
//! replays a previously exported run and [`TrendIntegrator`] produces smooth
//! trend series for demos and tests.

mod tabulated;
mod trend;

pub use tabulated::TabulatedIntegrator;
pub use trend::{TrendIntegrator, TrendParameters};
