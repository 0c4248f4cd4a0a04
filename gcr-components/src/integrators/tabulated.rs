use gcr_core::errors::{GcrError, GcrResult};
use gcr_core::integrator::{InitialStocks, Integrator, RawRun};
use gcr_core::timeseries::{FloatValue, Time, TimeAxis, Timeseries};
use gcr_core::timeseries_collection::{TimeseriesCollection, VariableType};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Replays tabulated integrator output.
///
/// Columns are linearly interpolated onto the requested time axis; the axis must
/// lie within the tabulated range. Initial stocks are ignored since the table
/// already reflects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedIntegrator {
    time: Vec<Time>,
    columns: BTreeMap<String, Vec<FloatValue>>,
}

impl TabulatedIntegrator {
    pub fn new(time: Vec<Time>, columns: BTreeMap<String, Vec<FloatValue>>) -> GcrResult<Self> {
        let integrator = Self { time, columns };
        integrator.validate()?;
        Ok(integrator)
    }

    fn validate(&self) -> GcrResult<()> {
        TimeAxis::from_values(Array1::from(self.time.clone()))?;
        match self
            .columns
            .iter()
            .find(|(_, values)| values.len() != self.time.len())
        {
            Some((name, values)) => Err(GcrError::LengthMismatch {
                name: name.clone(),
                expected: self.time.len(),
                actual: values.len(),
            }),
            None => Ok(()),
        }
    }
}

#[typetag::serde(name = "tabulated")]
impl Integrator for TabulatedIntegrator {
    fn integrate(&self, time_axis: &Arc<TimeAxis>, _initial: &InitialStocks) -> GcrResult<RawRun> {
        self.validate()?;
        let time = Array1::from(self.time.clone());

        let mut collection = TimeseriesCollection::new(time_axis.clone());
        for (name, values) in &self.columns {
            let source = Timeseries::from_values(Array1::from(values.clone()), time.clone())?;
            let resampled = time_axis
                .iter()
                .map(|t| source.at_time(t))
                .collect::<GcrResult<Vec<_>>>()?;
            collection.add_values(name.as_str(), resampled, "", VariableType::Exogenous)?;
        }
        RawRun::new(collection)
    }
}
