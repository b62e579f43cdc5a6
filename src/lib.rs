//! Meterhub - in-process metrics registry
//!
//! A name-keyed catalog of instrumentation handles (counters, gauges,
//! meters, timers, histograms) that application code creates once and
//! updates on hot paths. Registries support atomic get-or-create,
//! composable namespace prefixing, and a background arbiter that keeps
//! rate-based metrics ticking even when nothing is polling them.

pub mod arbiter;
pub mod config;
pub mod error;
pub mod metric;
pub mod registry;

pub use arbiter::Arbiter;
pub use config::{ArbiterConfig, Config};
pub use error::RegistryError;
pub use metric::{Counter, Gauge, Histogram, Meter, Metric, MetricSource, Tickable, Timer};
pub use registry::{
    default_registry, resolve_chain, PrefixedRegistry, Registry, StandardRegistry,
};

/// Library version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
