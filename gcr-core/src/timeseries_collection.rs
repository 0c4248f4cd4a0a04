use crate::errors::{GcrError, GcrResult};
use crate::timeseries::{FloatValue, Time, TimeAxis, Timeseries};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum VariableType {
    /// Values produced by the external integrator
    Exogenous,
    /// Values derived by the policy layer
    Endogenous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesItem {
    pub timeseries: Timeseries,
    pub name: String,
    pub variable_type: VariableType,
}

/// A collection of time series data sharing a single time axis.
///
/// This is the per-timestep table of a run: each item is a named column and
/// every column has one value per timestep. Columns keep their insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesCollection {
    time_axis: Arc<TimeAxis>,
    items: Vec<TimeseriesItem>,
}

impl TimeseriesCollection {
    pub fn new(time_axis: Arc<TimeAxis>) -> Self {
        Self {
            time_axis,
            items: Vec::new(),
        }
    }

    pub fn time_axis(&self) -> &Arc<TimeAxis> {
        &self.time_axis
    }

    /// Number of timesteps (rows) in the table
    pub fn len(&self) -> usize {
        self.time_axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_axis.is_empty()
    }

    /// Add a new timeseries to the collection
    ///
    /// Fails if a timeseries with the same name already exists or if the timeseries
    /// is not defined on the collection's time axis.
    pub fn add_timeseries(
        &mut self,
        name: impl Into<String>,
        timeseries: Timeseries,
        variable_type: VariableType,
    ) -> GcrResult<()> {
        let name = name.into();
        if self.get_by_name(&name).is_some() {
            return Err(GcrError::DuplicateTimeseries(name));
        }
        if timeseries.time_axis().as_ref() != self.time_axis.as_ref() {
            return Err(GcrError::LengthMismatch {
                name,
                expected: self.time_axis.len(),
                actual: timeseries.len(),
            });
        }

        self.items.push(TimeseriesItem {
            timeseries,
            name,
            variable_type,
        });
        Ok(())
    }

    /// Add a column from raw values on the collection's time axis.
    pub fn add_values(
        &mut self,
        name: impl Into<String>,
        values: Vec<FloatValue>,
        unit: &str,
        variable_type: VariableType,
    ) -> GcrResult<()> {
        let timeseries = Timeseries::new(values.into(), self.time_axis.clone(), unit)?;
        self.add_timeseries(name, timeseries, variable_type)
    }

    /// Add a column, replacing the values of an existing column with the same name.
    ///
    /// The variable type of a replaced column is kept.
    pub fn upsert_values(
        &mut self,
        name: &str,
        values: Vec<FloatValue>,
        unit: &str,
        variable_type: VariableType,
    ) -> GcrResult<()> {
        match self.get_by_name_mut(name) {
            Some(item) => {
                let axis = item.timeseries.time_axis().clone();
                item.timeseries = Timeseries::new(values.into(), axis, unit)?;
                Ok(())
            }
            None => self.add_values(name, values, unit, variable_type),
        }
    }

    pub fn get_by_name(&self, name: &str) -> Option<&TimeseriesItem> {
        self.items.iter().find(|x| x.name == name)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut TimeseriesItem> {
        self.items.iter_mut().find(|x| x.name == name)
    }

    pub fn get_timeseries_by_name(&self, name: &str) -> Option<&Timeseries> {
        self.get_by_name(name).map(|item| &item.timeseries)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }

    /// Value of a column at a time index
    pub fn value(&self, name: &str, time_index: usize) -> Option<FloatValue> {
        self.get_timeseries_by_name(name)
            .and_then(|ts| ts.at(time_index))
    }

    /// Copy a column's values out as a plain vector.
    pub fn values_of(&self, name: &str) -> GcrResult<Vec<FloatValue>> {
        self.get_timeseries_by_name(name)
            .map(|ts| ts.values().to_vec())
            .ok_or_else(|| GcrError::MissingTimeseries(name.to_string()))
    }

    pub fn set_value(&mut self, name: &str, time_index: usize, value: FloatValue) -> GcrResult<()> {
        self.get_by_name_mut(name)
            .ok_or_else(|| GcrError::MissingTimeseries(name.to_string()))?
            .timeseries
            .set(time_index, value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|x| x.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeseriesItem> {
        self.items.iter()
    }

    /// A single row of the table as `(name, value)` pairs, in column order.
    pub fn row(&self, time_index: usize) -> Option<(Time, Vec<(&str, FloatValue)>)> {
        let time = self.time_axis.at(time_index)?;
        let values = self
            .items
            .iter()
            .filter_map(|item| {
                item.timeseries
                    .at(time_index)
                    .map(|v| (item.name.as_str(), v))
            })
            .collect();
        Some((time, values))
    }
}

impl IntoIterator for TimeseriesCollection {
    type Item = TimeseriesItem;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn axis() -> Arc<TimeAxis> {
        Arc::new(TimeAxis::regular(2020.0, 2022.0, 1.0).unwrap())
    }

    #[test]
    fn adding() {
        let mut collection = TimeseriesCollection::new(axis());

        collection
            .add_values(
                "population",
                vec![7800.0, 7900.0, 8000.0],
                "million",
                VariableType::Exogenous,
            )
            .unwrap();
        collection
            .add_values(
                "net_emissions",
                vec![1.0, 2.0, 3.0],
                "MtCO2e / yr",
                VariableType::Endogenous,
            )
            .unwrap();

        assert_eq!(collection.len(), 3);
        assert_eq!(
            collection.names().collect::<Vec<_>>(),
            vec!["population", "net_emissions"]
        );
        assert_eq!(collection.value("population", 2), Some(8000.0));
    }

    #[test]
    fn adding_same_name() {
        let mut collection = TimeseriesCollection::new(axis());
        collection
            .add_values("test", vec![1.0, 2.0, 3.0], "", VariableType::Exogenous)
            .unwrap();
        let err = collection
            .add_values("test", vec![1.0, 2.0, 3.0], "", VariableType::Endogenous)
            .unwrap_err();
        assert!(matches!(err, GcrError::DuplicateTimeseries(_)));
    }

    #[test]
    fn rejects_foreign_time_axis() {
        let mut collection = TimeseriesCollection::new(axis());
        let other =
            Timeseries::from_values(array![1.0, 2.0, 3.0], array![2030.0, 2031.0, 2032.0]).unwrap();
        assert!(collection
            .add_timeseries("other", other, VariableType::Exogenous)
            .is_err());
    }

    #[test]
    fn upsert_replaces_existing_values() {
        let mut collection = TimeseriesCollection::new(axis());
        collection
            .add_values(
                "industrial_output",
                vec![100.0, 101.0, 102.0],
                "",
                VariableType::Exogenous,
            )
            .unwrap();
        collection
            .upsert_values(
                "industrial_output",
                vec![99.0, 98.0, 97.0],
                "",
                VariableType::Endogenous,
            )
            .unwrap();

        let item = collection.get_by_name("industrial_output").unwrap();
        assert_eq!(item.variable_type, VariableType::Exogenous);
        assert_eq!(item.timeseries.values().to_vec(), vec![99.0, 98.0, 97.0]);
    }

    #[test]
    fn set_value_on_missing_column_fails() {
        let mut collection = TimeseriesCollection::new(axis());
        assert!(matches!(
            collection.set_value("missing", 0, 1.0),
            Err(GcrError::MissingTimeseries(_))
        ));
    }

    #[test]
    fn row_follows_column_order() {
        let mut collection = TimeseriesCollection::new(axis());
        collection
            .add_values("a", vec![1.0, 2.0, 3.0], "", VariableType::Exogenous)
            .unwrap();
        collection
            .add_values("b", vec![4.0, 5.0, 6.0], "", VariableType::Endogenous)
            .unwrap();

        let (time, values) = collection.row(1).unwrap();
        assert_eq!(time, 2021.0);
        assert_eq!(values, vec![("a", 2.0), ("b", 5.0)]);
        assert!(collection.row(3).is_none());
    }
}
