//! Prefix-composing registry wrapper
//!
//! Rewrites names on the way in by prepending a fixed prefix, then forwards
//! to a parent registry. No separator is inserted; the prefix segment
//! carries its own delimiter (typically a trailing dot). Chains compose
//! outermost-first: registering `"x"` through parents `"p."` then `"q."`
//! stores `"p.q.x"` at the root.

use std::sync::Arc;

use super::{Registry, StandardRegistry};
use crate::error::RegistryError;
use crate::metric::{Metric, MetricSource};

/// Registry that prepends a fixed prefix to every name.
///
/// Adds no locking of its own; all atomicity comes from the parent.
pub struct PrefixedRegistry {
    parent: Arc<dyn Registry>,
    prefix: String,
}

impl PrefixedRegistry {
    /// Prefixed registry over a private fresh base registry.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_parent(Arc::new(StandardRegistry::new()), prefix)
    }

    /// Prefixed child of an arbitrary parent registry, which may itself be
    /// prefixed.
    pub fn with_parent(parent: Arc<dyn Registry>, prefix: impl Into<String>) -> Self {
        Self {
            parent,
            prefix: prefix.into(),
        }
    }

    fn qualify(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}

impl Registry for PrefixedRegistry {
    fn register(&self, name: &str, metric: Arc<dyn Metric>) -> Result<(), RegistryError> {
        self.parent.register(&self.qualify(name), metric)
    }

    fn unregister(&self, name: &str) {
        self.parent.unregister(&self.qualify(name));
    }

    fn get(&self, name: &str) -> Option<Arc<dyn Metric>> {
        self.parent.get(&self.qualify(name))
    }

    fn get_or_register(&self, name: &str, source: MetricSource) -> Arc<dyn Metric> {
        self.parent.get_or_register(&self.qualify(name), source)
    }

    fn each(&self, visit: &mut dyn FnMut(&str, &Arc<dyn Metric>)) {
        // Storage is keyed by the fully prefixed name and that is what
        // visitors observe.
        self.parent.each(visit);
    }

    fn prefix_segment(&self) -> &str {
        &self.prefix
    }

    fn parent(&self) -> Option<Arc<dyn Registry>> {
        Some(self.parent.clone())
    }
}
