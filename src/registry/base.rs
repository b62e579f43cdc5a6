//! Base registry
//!
//! The core name-to-handle store: a map guarded by a single mutex plus
//! arbiter bookkeeping for tickable metrics.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::Registry;
use crate::arbiter::Arbiter;
use crate::error::RegistryError;
use crate::metric::{downcast, Metric, MetricId, MetricSource};

/// The base registry implementation.
///
/// One mutex covers every read and write of the map, which is what makes
/// register/get-or-register/unregister linearizable per name. Arbiter
/// bookkeeping happens after the map lock is released, so no thread ever
/// holds the registry lock and the arbiter's set simultaneously.
pub struct StandardRegistry {
    metrics: Mutex<HashMap<String, Arc<dyn Metric>>>,
    arbiter: Arc<Arbiter>,
}

impl StandardRegistry {
    /// Registry backed by the process-wide arbiter.
    pub fn new() -> Self {
        Self::with_arbiter(Arbiter::global().clone())
    }

    /// Registry backed by a caller-owned arbiter. Tests use this for
    /// isolated tick bookkeeping.
    pub fn with_arbiter(arbiter: Arc<Arbiter>) -> Self {
        Self {
            metrics: Mutex::new(HashMap::new()),
            arbiter,
        }
    }

    /// Typed lookup: the handle for `name` if it is an `M`.
    pub fn get_as<M: Metric>(&self, name: &str) -> Option<Arc<M>> {
        self.get(name).and_then(downcast::<M>)
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Arbiter bookkeeping for a freshly inserted tickable metric.
    ///
    /// Runs after the map lock is released so no thread holds the registry
    /// lock and the arbiter's set at once. That leaves a window where a
    /// racing unregister already ran its (no-op) arbiter removal; the
    /// re-check backs the add out unless the name still holds this exact
    /// handle.
    fn track_tickable(&self, name: &str, metric: &Arc<dyn Metric>) {
        self.arbiter.add(metric);

        let still_current =
            self.metrics.lock().get(name).map(MetricId::of) == Some(MetricId::of(metric));
        if !still_current {
            self.arbiter.remove(metric);
        }
    }

    /// Mirror of `track_tickable` for removal: a racing register may have
    /// reinstalled the same handle before the arbiter removal lands, in
    /// which case its entry is restored.
    fn untrack_tickable(&self, name: &str, metric: &Arc<dyn Metric>) {
        self.arbiter.remove(metric);

        let reinstated =
            self.metrics.lock().get(name).map(MetricId::of) == Some(MetricId::of(metric));
        if reinstated {
            self.arbiter.add(metric);
        }
    }
}

impl Default for StandardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for StandardRegistry {
    fn register(&self, name: &str, metric: Arc<dyn Metric>) -> Result<(), RegistryError> {
        {
            let mut metrics = self.metrics.lock();
            if metrics.contains_key(name) {
                return Err(RegistryError::DuplicateMetric(name.to_string()));
            }
            metrics.insert(name.to_string(), metric.clone());
        }

        if metric.as_tickable().is_some() {
            self.track_tickable(name, &metric);
        }
        debug!(name, "Metric registered");
        Ok(())
    }

    fn unregister(&self, name: &str) {
        let removed = self.metrics.lock().remove(name);

        if let Some(metric) = removed {
            if metric.as_tickable().is_some() {
                self.untrack_tickable(name, &metric);
            }
            debug!(name, "Metric unregistered");
        }
    }

    fn get(&self, name: &str) -> Option<Arc<dyn Metric>> {
        self.metrics.lock().get(name).cloned()
    }

    fn get_or_register(&self, name: &str, source: MetricSource) -> Arc<dyn Metric> {
        let metric = {
            let mut metrics = self.metrics.lock();
            if let Some(existing) = metrics.get(name) {
                return existing.clone();
            }

            // A lazy source builds while the lock is held, so exactly one
            // instance is ever installed for a raced name.
            let metric = source.build();
            metrics.insert(name.to_string(), metric.clone());
            metric
        };

        if metric.as_tickable().is_some() {
            self.track_tickable(name, &metric);
        }
        debug!(name, "Metric registered");
        metric
    }

    fn each(&self, visit: &mut dyn FnMut(&str, &Arc<dyn Metric>)) {
        // Snapshot first so the visitor can re-enter the registry without
        // deadlocking on the map lock.
        let snapshot: Vec<(String, Arc<dyn Metric>)> = {
            let metrics = self.metrics.lock();
            metrics
                .iter()
                .map(|(name, metric)| (name.clone(), metric.clone()))
                .collect()
        };

        for (name, metric) in &snapshot {
            visit(name, metric);
        }
    }
}
