//! Field-level failure handling.
//!
//! A run tolerates a failed derivation of a single field at a single timestep by
//! falling back to the value from the previous stage. Every fallback is recorded
//! as a [`Diagnostic`] so a deliberate no-op can be told apart from a masked error.

use crate::errors::GcrResult;
use crate::timeseries::Time;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do when a field cannot be derived for a timestep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep the previous-stage value, record a diagnostic and continue
    #[default]
    Fallback,
    /// Stop the run and return the error
    Abort,
}

/// A tolerated failure or a clamped configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Timestep the diagnostic refers to, if any
    pub time: Option<Time>,
    /// Field or configuration key
    pub field: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(time: Option<Time>, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            time,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl FailurePolicy {
    /// Resolve the outcome of a single field derivation.
    ///
    /// Under [`FailurePolicy::Fallback`] an error is replaced by `fallback` and a
    /// diagnostic is pushed onto `diagnostics`. Under [`FailurePolicy::Abort`] the
    /// error is returned unchanged.
    pub fn resolve<T>(
        &self,
        field: &str,
        time: Time,
        result: GcrResult<T>,
        fallback: T,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> GcrResult<T> {
        match (result, self) {
            (Ok(value), _) => Ok(value),
            (Err(e), FailurePolicy::Abort) => Err(e),
            (Err(e), FailurePolicy::Fallback) => {
                warn!(field, time, error = %e, "Field derivation failed; keeping previous value");
                diagnostics.push(Diagnostic::new(Some(time), field, e.to_string()));
                Ok(fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ensure_finite;
    use crate::timeseries::FloatValue;

    #[test]
    fn fallback_replaces_error_and_records_diagnostic() {
        let mut diagnostics = vec![];
        let value = FailurePolicy::Fallback
            .resolve(
                "industrial_output",
                2040.0,
                ensure_finite("industrial_output", 2040.0, FloatValue::INFINITY),
                95.0,
                &mut diagnostics,
            )
            .unwrap();

        assert_eq!(value, 95.0);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].time, Some(2040.0));
        assert_eq!(diagnostics[0].field, "industrial_output");
    }

    #[test]
    fn abort_propagates_error() {
        let mut diagnostics = vec![];
        let result = FailurePolicy::Abort.resolve(
            "industrial_output",
            2040.0,
            ensure_finite("industrial_output", 2040.0, FloatValue::NAN),
            95.0,
            &mut diagnostics,
        );

        assert!(result.is_err());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn success_leaves_no_trace() {
        let mut diagnostics = vec![];
        let value = FailurePolicy::Fallback
            .resolve("x", 2030.0, Ok(1.5), 0.0, &mut diagnostics)
            .unwrap();
        assert_eq!(value, 1.5);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn policy_deserialises_from_snake_case() {
        let policy: FailurePolicy = serde_json::from_str("\"abort\"").unwrap();
        assert_eq!(policy, FailurePolicy::Abort);
    }
}
