//! Name-keyed metric registries
//!
//! A registry stores metric handles under opaque string names. The base
//! implementation owns the guarded map; prefixed wrappers rewrite names on
//! the way in and out and delegate all storage and atomicity to their
//! parent. A process-wide default registry backs the free functions for
//! callers that do not want to thread a registry explicitly.

mod base;
mod prefixed;

pub use base::StandardRegistry;
pub use prefixed::PrefixedRegistry;

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::metric::{Metric, MetricSource};

/// Name-keyed store of metric handles, safe for arbitrary concurrent
/// callers.
///
/// Register/unregister/get-or-register on a single name are linearizable
/// with respect to each other; no ordering is guaranteed across names.
pub trait Registry: Send + Sync {
    /// Insert `metric` under `name`, failing if the name is taken.
    fn register(&self, name: &str, metric: Arc<dyn Metric>) -> Result<(), RegistryError>;

    /// Remove the entry for `name`; no-op if absent.
    fn unregister(&self, name: &str);

    /// Current handle for `name`, if any.
    fn get(&self, name: &str) -> Option<Arc<dyn Metric>>;

    /// Existing handle for `name`, or install one from `source`.
    ///
    /// First writer wins: racing callers all receive the single installed
    /// instance, and a losing `source` is discarded (a lazy source is
    /// discarded unbuilt).
    fn get_or_register(&self, name: &str, source: MetricSource) -> Arc<dyn Metric>;

    /// Visit every current entry over a point-in-time snapshot.
    ///
    /// The visitor may call back into the registry; mutations made during
    /// the pass are invisible to it. Order is unspecified. Names are the
    /// canonical stored names, fully prefixed.
    fn each(&self, visit: &mut dyn FnMut(&str, &Arc<dyn Metric>));

    /// Prefix segment this registry prepends, empty for base registries.
    fn prefix_segment(&self) -> &str {
        ""
    }

    /// Parent this registry forwards to, `None` for base registries.
    fn parent(&self) -> Option<Arc<dyn Registry>> {
        None
    }
}

/// Upper bound on chain depth during resolution. Chains are acyclic by
/// construction (a parent is fixed at construction time); the bound keeps a
/// pathological topology from walking forever.
const MAX_CHAIN_DEPTH: usize = 64;

/// Walk a registry's parent chain, returning the root registry and the
/// composed prefix.
///
/// Segments concatenate outermost-first with no separator inserted, so a
/// chain of `"p."` then `"q."` resolves to `"p.q."`. Pure over the chain's
/// current structure.
pub fn resolve_chain(registry: &Arc<dyn Registry>) -> (Arc<dyn Registry>, String) {
    let mut current = registry.clone();
    let mut prefix = String::new();

    for _ in 0..MAX_CHAIN_DEPTH {
        prefix.insert_str(0, current.prefix_segment());
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    (current, prefix)
}

static DEFAULT: Lazy<Arc<StandardRegistry>> = Lazy::new(|| Arc::new(StandardRegistry::new()));

/// Process-wide default registry.
pub fn default_registry() -> &'static Arc<StandardRegistry> {
    &DEFAULT
}

/// Register `metric` under `name` in the default registry.
pub fn register(name: &str, metric: Arc<dyn Metric>) -> Result<(), RegistryError> {
    DEFAULT.register(name, metric)
}

/// Remove `name` from the default registry.
pub fn unregister(name: &str) {
    DEFAULT.unregister(name);
}

/// Look up `name` in the default registry.
pub fn get(name: &str) -> Option<Arc<dyn Metric>> {
    DEFAULT.get(name)
}

/// Get-or-register against the default registry.
pub fn get_or_register(name: &str, source: MetricSource) -> Arc<dyn Metric> {
    DEFAULT.get_or_register(name, source)
}

/// Enumerate the default registry.
pub fn each(visit: &mut dyn FnMut(&str, &Arc<dyn Metric>)) {
    DEFAULT.each(visit);
}
