//! The seam to the external stock-and-flow integrator.
//!
//! The integrator is consumed through the [`Integrator`] trait and hands back an
//! immutable [`RawRun`]. Nothing downstream can reach into the integrator's
//! internal state; everything the policy layer needs is in the returned table.

use crate::errors::{GcrError, GcrResult};
use crate::standard_variables::{
    REQUIRED_RAW_VARIABLES, VAR_INDUSTRIAL_OUTPUT, VAR_POLLUTION_INDEX, VAR_POPULATION,
};
use crate::timeseries::{FloatValue, TimeAxis, Timeseries};
use crate::timeseries_collection::{TimeseriesCollection, VariableType};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Initial values of the integrator's stocks.
///
/// Population cohorts are in millions of people. The capital-like stocks are in
/// the integrator's own index units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialStocks {
    /// Population aged 0-14
    /// unit: million
    /// default: 650.0
    pub population_0_14: FloatValue,
    /// Population aged 15-44
    /// unit: million
    /// default: 700.0
    pub population_15_44: FloatValue,
    /// Population aged 45-64
    /// unit: million
    /// default: 190.0
    pub population_45_64: FloatValue,
    /// Population aged 65 and over
    /// unit: million
    /// default: 60.0
    pub population_65_plus: FloatValue,
    /// default: 300.0
    pub industrial_capital: FloatValue,
    /// default: 900.0
    pub arable_land: FloatValue,
    /// default: 144.0
    pub service_capital: FloatValue,
    /// default: 1000.0
    pub nonrenewable_resources: FloatValue,
    /// default: 1.0
    pub persistent_pollution: FloatValue,
}

impl Default for InitialStocks {
    fn default() -> Self {
        Self {
            population_0_14: 650.0,
            population_15_44: 700.0,
            population_45_64: 190.0,
            population_65_plus: 60.0,
            industrial_capital: 300.0,
            arable_land: 900.0,
            service_capital: 144.0,
            nonrenewable_resources: 1000.0,
            persistent_pollution: 1.0,
        }
    }
}

impl InitialStocks {
    /// The four cohorts, youngest first.
    pub fn cohorts(&self) -> [FloatValue; 4] {
        [
            self.population_0_14,
            self.population_15_44,
            self.population_45_64,
            self.population_65_plus,
        ]
    }

    pub fn total_population(&self) -> FloatValue {
        self.cohorts().iter().sum()
    }
}

/// The output of one integration: a read-only per-timestep table.
///
/// Always contains the columns listed in [`REQUIRED_RAW_VARIABLES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRun {
    collection: TimeseriesCollection,
}

impl RawRun {
    /// Wrap a collection, checking the required columns are present.
    pub fn new(collection: TimeseriesCollection) -> GcrResult<Self> {
        if let Some(missing) = REQUIRED_RAW_VARIABLES
            .iter()
            .find(|&&name| !collection.has(name))
        {
            return Err(GcrError::MissingTimeseries(missing.to_string()));
        }
        Ok(Self { collection })
    }

    /// Build a run from named value vectors on `time_axis`.
    pub fn from_columns<'a>(
        time_axis: Arc<TimeAxis>,
        columns: impl IntoIterator<Item = (&'a str, Vec<FloatValue>)>,
    ) -> GcrResult<Self> {
        let mut collection = TimeseriesCollection::new(time_axis);
        for (name, values) in columns {
            collection.add_values(name, values, "", VariableType::Exogenous)?;
        }
        Self::new(collection)
    }

    pub fn time_axis(&self) -> &Arc<TimeAxis> {
        self.collection.time_axis()
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn population(&self) -> &Timeseries {
        self.required(VAR_POPULATION)
    }

    pub fn industrial_output(&self) -> &Timeseries {
        self.required(VAR_INDUSTRIAL_OUTPUT)
    }

    pub fn pollution_index(&self) -> &Timeseries {
        self.required(VAR_POLLUTION_INDEX)
    }

    /// An optional column such as a cohort or a per-capita series.
    pub fn optional(&self, name: &str) -> Option<&Timeseries> {
        self.collection.get_timeseries_by_name(name)
    }

    pub fn collection(&self) -> &TimeseriesCollection {
        &self.collection
    }

    pub fn into_collection(self) -> TimeseriesCollection {
        self.collection
    }

    fn required(&self, name: &str) -> &Timeseries {
        // Presence is checked in `RawRun::new`
        match self.collection.get_timeseries_by_name(name) {
            Some(ts) => ts,
            None => unreachable!("required column {name} missing from raw run"),
        }
    }
}

/// A source of raw per-timestep state.
///
/// Implementations are serialisable so a scenario file can name the integrator
/// it runs against.
#[typetag::serde(tag = "type")]
pub trait Integrator: Debug + Send + Sync {
    /// Integrate over `time_axis` starting from `initial`.
    ///
    /// The returned run must be defined on exactly `time_axis`.
    fn integrate(&self, time_axis: &Arc<TimeAxis>, initial: &InitialStocks) -> GcrResult<RawRun>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> Arc<TimeAxis> {
        Arc::new(TimeAxis::regular(2025.0, 2027.0, 1.0).unwrap())
    }

    #[test]
    fn raw_run_requires_core_columns() {
        let err = RawRun::from_columns(
            axis(),
            [
                (VAR_POPULATION, vec![1.0, 2.0, 3.0]),
                (VAR_INDUSTRIAL_OUTPUT, vec![1.0, 2.0, 3.0]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, GcrError::MissingTimeseries(name) if name == VAR_POLLUTION_INDEX));
    }

    #[test]
    fn raw_run_exposes_columns() {
        let run = RawRun::from_columns(
            axis(),
            [
                (VAR_POPULATION, vec![8000.0, 8050.0, 8100.0]),
                (VAR_INDUSTRIAL_OUTPUT, vec![100.0, 102.0, 104.0]),
                (VAR_POLLUTION_INDEX, vec![1.0, 1.1, 1.2]),
            ],
        )
        .unwrap();

        assert_eq!(run.len(), 3);
        assert_eq!(run.industrial_output().at(1), Some(102.0));
        assert!(run.optional("food_per_capita").is_none());
    }

    #[test]
    fn default_stocks_total() {
        let stocks = InitialStocks::default();
        assert_eq!(stocks.total_population(), 1600.0);
    }
}
