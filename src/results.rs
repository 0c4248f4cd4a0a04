use gcr_components::components::{RebalanceOutcome, RewardHistory};
use gcr_core::diagnostics::Diagnostic;
use gcr_core::errors::GcrResult;
use gcr_core::timeseries::{FloatValue, Time, TimeAxis, Timeseries};
use gcr_core::timeseries_collection::TimeseriesCollection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One row of the per-timestep table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub year: Time,
    #[serde(flatten)]
    pub values: BTreeMap<String, FloatValue>,
}

/// The immutable output of one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    table: TimeseriesCollection,
    reward_history: RewardHistory,
    rebalance: RebalanceOutcome,
    diagnostics: Vec<Diagnostic>,
}

impl SimulationResults {
    pub fn new(
        table: TimeseriesCollection,
        reward_history: RewardHistory,
        rebalance: RebalanceOutcome,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            table,
            reward_history,
            rebalance,
            diagnostics,
        }
    }

    /// The raw integrator columns augmented with the derived columns
    pub fn table(&self) -> &TimeseriesCollection {
        &self.table
    }

    pub fn time_axis(&self) -> &Arc<TimeAxis> {
        self.table.time_axis()
    }

    /// Number of timesteps
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Timeseries> {
        self.table.get_timeseries_by_name(name)
    }

    pub fn values(&self, name: &str) -> GcrResult<Vec<FloatValue>> {
        self.table.values_of(name)
    }

    /// Value of a column at the last timestep
    pub fn final_value(&self, name: &str) -> Option<FloatValue> {
        self.column(name).and_then(|ts| ts.latest_value())
    }

    pub fn reward_history(&self) -> &RewardHistory {
        &self.reward_history
    }

    pub fn rebalance(&self) -> &RebalanceOutcome {
        &self.rebalance
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Flatten the table into one record per timestep.
    pub fn to_records(&self) -> Vec<ResultRecord> {
        (0..self.len())
            .filter_map(|i| self.table.row(i))
            .map(|(year, row)| ResultRecord {
                year,
                values: row
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect(),
            })
            .collect()
    }
}
