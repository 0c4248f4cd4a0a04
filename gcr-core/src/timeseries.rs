//! Time axes and scalar timeseries.
//!
//! Every per-timestep record in a run is indexed by a single [`TimeAxis`].
//! Timeseries share the axis through an [`Arc`] so that columns of the same run
//! can be checked for alignment cheaply.

use crate::errors::{GcrError, GcrResult};
use crate::interpolate::{bracket, linear, Bracket};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type Time = f64;
pub type FloatValue = f64;

/// Tolerance used when matching a requested time against axis values.
const TIME_TOLERANCE: Time = 1e-9;

/// Upper bound on the number of points in a regular axis
pub const MAX_TIMESTEPS: usize = 1_000_000;

/// An ordered, strictly increasing sequence of times (in years).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    values: Array1<Time>,
}

impl TimeAxis {
    /// Build an axis from explicit values.
    ///
    /// The values must be non-empty, finite and strictly increasing.
    pub fn from_values(values: Array1<Time>) -> GcrResult<Self> {
        if values.is_empty() {
            return Err(GcrError::InvalidTimeAxis(
                "a time axis needs at least one value".to_string(),
            ));
        }
        if values.iter().any(|t| !t.is_finite()) {
            return Err(GcrError::InvalidTimeAxis(
                "time values must be finite".to_string(),
            ));
        }
        if values
            .iter()
            .zip(values.iter().skip(1))
            .any(|(a, b)| b <= a)
        {
            return Err(GcrError::InvalidTimeAxis(
                "time values must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { values })
    }

    /// Build an evenly spaced axis from `start` to `stop` inclusive.
    ///
    /// Each value is computed as `start + i * dt` so no rounding error accumulates
    /// along the axis. If `dt` does not divide the span exactly the axis stops at the
    /// last point not after `stop`.
    pub fn regular(start: Time, stop: Time, dt: Time) -> GcrResult<Self> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(GcrError::InvalidTimeAxis(format!(
                "step must be positive, got {dt}"
            )));
        }
        if !start.is_finite() || !stop.is_finite() {
            return Err(GcrError::InvalidTimeAxis(format!(
                "start ({start}) and stop ({stop}) must be finite"
            )));
        }
        if !(stop > start) {
            return Err(GcrError::InvalidTimeAxis(format!(
                "stop ({stop}) must be after start ({start})"
            )));
        }
        let steps = ((stop - start) / dt + TIME_TOLERANCE).floor();
        if !(steps < MAX_TIMESTEPS as Time) {
            return Err(GcrError::InvalidTimeAxis(format!(
                "{steps} steps from {start} to {stop} exceeds the limit of {MAX_TIMESTEPS}"
            )));
        }
        let n = steps as usize + 1;
        let values = Array1::from_iter((0..n).map(|i| start + i as Time * dt));
        Self::from_values(values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Array1<Time> {
        &self.values
    }

    /// Time at a given index
    pub fn at(&self, index: usize) -> Option<Time> {
        self.values.get(index).copied()
    }

    pub fn first(&self) -> Time {
        self.values[0]
    }

    pub fn last(&self) -> Time {
        self.values[self.values.len() - 1]
    }

    /// Spacing between the first two points.
    ///
    /// A single-point axis has no spacing and returns `None`.
    pub fn step(&self) -> Option<Time> {
        match (self.at(0), self.at(1)) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        }
    }

    /// Index of the point matching `time` (within a small tolerance).
    pub fn index_of(&self, time: Time) -> Option<usize> {
        self.values
            .iter()
            .position(|t| (t - time).abs() <= TIME_TOLERANCE)
    }

    pub fn iter(&self) -> impl Iterator<Item = Time> + '_ {
        self.values.iter().copied()
    }
}

/// A scalar timeseries aligned to a shared [`TimeAxis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeseries {
    values: Array1<FloatValue>,
    time_axis: Arc<TimeAxis>,
    unit: String,
}

impl Timeseries {
    pub fn new(
        values: Array1<FloatValue>,
        time_axis: Arc<TimeAxis>,
        unit: impl Into<String>,
    ) -> GcrResult<Self> {
        if values.len() != time_axis.len() {
            return Err(GcrError::LengthMismatch {
                name: "timeseries values".to_string(),
                expected: time_axis.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            values,
            time_axis,
            unit: unit.into(),
        })
    }

    /// Create a timeseries with a fresh time axis built from `time`.
    pub fn from_values(values: Array1<FloatValue>, time: Array1<Time>) -> GcrResult<Self> {
        let time_axis = Arc::new(TimeAxis::from_values(time)?);
        Self::new(values, time_axis, "")
    }

    /// A timeseries holding `value` at every point of `time_axis`.
    pub fn filled(time_axis: Arc<TimeAxis>, value: FloatValue, unit: impl Into<String>) -> Self {
        Self {
            values: Array1::from_elem(time_axis.len(), value),
            time_axis,
            unit: unit.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.values
    }

    pub fn time_axis(&self) -> &Arc<TimeAxis> {
        &self.time_axis
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn at(&self, index: usize) -> Option<FloatValue> {
        self.values.get(index).copied()
    }

    pub fn latest_value(&self) -> Option<FloatValue> {
        self.values.last().copied()
    }

    pub fn set(&mut self, index: usize, value: FloatValue) -> GcrResult<()> {
        let len = self.values.len();
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(GcrError::LengthMismatch {
                name: format!("timeseries index {index}"),
                expected: len,
                actual: index + 1,
            }),
        }
    }

    /// Linearly interpolated value at an arbitrary time.
    ///
    /// Times outside the axis are an error rather than being extrapolated.
    pub fn at_time(&self, time: Time) -> GcrResult<FloatValue> {
        let times = self.time_axis.values();
        match bracket(times.view(), time) {
            Bracket::Exact(i) => Ok(self.values[i]),
            Bracket::Between(i, j) => Ok(linear(
                time,
                (times[i], self.values[i]),
                (times[j], self.values[j]),
            )),
            Bracket::Before | Bracket::After => Err(GcrError::ExtrapolationNotAllowed {
                target: time,
                start: self.time_axis.first(),
                end: self.time_axis.last(),
            }),
        }
    }
}
