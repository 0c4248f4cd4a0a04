//! The most recent completed comparison, shared with concurrent readers.

use crate::comparison::ScenarioComparison;
use crate::config::ScenarioConfig;
use gcr_core::errors::{GcrError, GcrResult};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Holds the latest comparison behind a mutex-guarded swap.
///
/// Runs happen outside the lock and only the finished [`Arc`] is swapped in, so
/// a reader sees either the whole previous comparison or the whole new one.
#[derive(Debug, Default)]
pub struct ResultsCache {
    latest: Mutex<Option<Arc<ScenarioComparison>>>,
}

impl ResultsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> GcrResult<Option<Arc<ScenarioComparison>>> {
        let guard = self.latest.lock().map_err(|_| GcrError::CachePoisoned)?;
        Ok(guard.clone())
    }

    /// Replace the cached comparison.
    pub fn publish(&self, comparison: ScenarioComparison) -> GcrResult<Arc<ScenarioComparison>> {
        let comparison = Arc::new(comparison);
        let mut guard = self.latest.lock().map_err(|_| GcrError::CachePoisoned)?;
        *guard = Some(comparison.clone());
        Ok(comparison)
    }

    /// Run a fresh comparison and publish it.
    ///
    /// A failed run leaves the previous comparison in place.
    pub fn refresh(&self, config: &ScenarioConfig) -> GcrResult<Arc<ScenarioComparison>> {
        let comparison = ScenarioComparison::run(config)?;
        debug!("Publishing new comparison");
        self.publish(comparison)
    }

    /// The cached comparison, running one first if the cache is empty.
    pub fn get_or_refresh(&self, config: &ScenarioConfig) -> GcrResult<Arc<ScenarioComparison>> {
        match self.latest()? {
            Some(comparison) => Ok(comparison),
            None => self.refresh(config),
        }
    }
}
