//! Population rebalancing
//!
//! A one-time transform of the initial stocks, applied before integration, that
//! scales the four population cohorts to a target total.

use crate::parameters::RebalanceParameters;
use gcr_core::diagnostics::Diagnostic;
use gcr_core::integrator::InitialStocks;
use gcr_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of rebalancing the initial stocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceOutcome {
    pub stocks: InitialStocks,
    /// Factor applied to the cohorts (1.0 when nothing was scaled)
    pub factor: FloatValue,
    /// Whether a target was applied at all
    pub applied: bool,
}

/// Scales the initial cohorts to a target total population.
///
/// Cohorts are multiplied by `factor = target / total`, so their proportions are
/// unchanged. Capital-like stocks follow with `factor * damping`.
///
/// An absent or zero target is a no-op and the stocks are returned bit-identical.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationRebalancer {
    parameters: RebalanceParameters,
}

impl PopulationRebalancer {
    pub fn from_parameters(parameters: RebalanceParameters) -> Self {
        Self { parameters }
    }

    /// The target that will be applied, if any.
    ///
    /// Negative or non-finite targets are treated as absent and reported.
    pub fn effective_target(&self, diagnostics: &mut Vec<Diagnostic>) -> Option<FloatValue> {
        match self.parameters.target_population {
            None => None,
            Some(t) if t == 0.0 => None,
            Some(t) if !t.is_finite() || t < 0.0 => {
                warn!(target = t, "Ignoring invalid target population");
                diagnostics.push(Diagnostic::new(
                    None,
                    "target_population",
                    format!("invalid target {t} treated as no target"),
                ));
                None
            }
            Some(t) => Some(t),
        }
    }

    pub fn rebalance(
        &self,
        stocks: &InitialStocks,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> RebalanceOutcome {
        let Some(target) = self.effective_target(diagnostics) else {
            return RebalanceOutcome {
                stocks: stocks.clone(),
                factor: 1.0,
                applied: false,
            };
        };

        let total = stocks.total_population();
        if !(total > 0.0) {
            warn!(target, total, "Skipping rebalance of an empty population");
            diagnostics.push(Diagnostic::new(
                None,
                "target_population",
                format!("initial population {total} cannot be scaled to {target}"),
            ));
            return RebalanceOutcome {
                stocks: stocks.clone(),
                factor: 1.0,
                applied: false,
            };
        }
        let factor = target / total;
        debug!(target, total, factor, "Rebalancing initial population");

        let damping = &self.parameters.damping;
        let scaled = InitialStocks {
            population_0_14: stocks.population_0_14 * factor,
            population_15_44: stocks.population_15_44 * factor,
            population_45_64: stocks.population_45_64 * factor,
            population_65_plus: stocks.population_65_plus * factor,
            industrial_capital: stocks.industrial_capital * factor * damping.industrial_capital,
            arable_land: stocks.arable_land * factor * damping.arable_land,
            service_capital: stocks.service_capital * factor * damping.service_capital,
            nonrenewable_resources: stocks.nonrenewable_resources
                * factor
                * damping.nonrenewable_resources,
            persistent_pollution: stocks.persistent_pollution
                * factor
                * damping.persistent_pollution,
        };

        RebalanceOutcome {
            stocks: scaled,
            factor,
            applied: true,
        }
    }
}
