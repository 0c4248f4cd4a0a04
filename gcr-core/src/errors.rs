use crate::timeseries::{FloatValue, Time};
use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum GcrError {
    #[error("{0}")]
    Error(String),
    #[error("Extrapolation is not allowed. Target={target}, interpolation range=[{start}, {end}]")]
    ExtrapolationNotAllowed {
        target: Time,
        start: Time,
        end: Time,
    },
    #[error("Invalid time axis: {0}")]
    InvalidTimeAxis(String),
    #[error("Length mismatch for {name}: expected {expected} values, got {actual}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Timeseries {0} not found")]
    MissingTimeseries(String),
    #[error("Timeseries {0} already exists")]
    DuplicateTimeseries(String),
    #[error("Non-finite value {value} derived for {field} at {time}")]
    NonFiniteValue {
        field: String,
        time: Time,
        value: FloatValue,
    },
    #[error("Reward evaluated out of order: {time} does not follow {previous}")]
    RewardOutOfOrder { time: Time, previous: Time },
    #[error("Invalid historical CO2 table: {0}")]
    InvalidCalibrationTable(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Results cache lock was poisoned by a panicking writer")]
    CachePoisoned,
}

/// Convenience type for `Result<T, GcrError>`.
pub type GcrResult<T> = Result<T, GcrError>;

/// Reject NaN and infinite values produced while deriving `field` at `time`.
pub fn ensure_finite(field: &str, time: Time, value: FloatValue) -> GcrResult<FloatValue> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GcrError::NonFiniteValue {
            field: field.to_string(),
            time,
            value,
        })
    }
}
