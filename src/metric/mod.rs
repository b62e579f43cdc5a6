//! Metric capability contracts and concrete kinds
//!
//! The registry stores metrics as opaque `Arc<dyn Metric>` handles. It never
//! inspects a handle beyond its identity and the optional tickable
//! capability, so new kinds can be added without touching registry code.

mod counter;
mod gauge;
mod histogram;
mod meter;
mod timer;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::Histogram;
pub use meter::Meter;
pub use timer::Timer;

use std::any::Any;
use std::sync::Arc;

/// A metric whose rate/decay state must be advanced periodically.
pub trait Tickable {
    /// Advance internal time-window state by one period.
    ///
    /// Must not block and must tolerate any internal state.
    fn tick(&self);
}

/// Capability surface the registry requires from every metric kind.
pub trait Metric: Any + Send + Sync {
    /// Borrow as `Any` for fallible downcasts to a concrete kind.
    fn as_any(&self) -> &dyn Any;

    /// Convert the shared handle for `Arc`-level downcasts.
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// The tickable capability, if this kind carries rate/decay state.
    fn as_tickable(&self) -> Option<&dyn Tickable> {
        None
    }
}

/// Downcast a shared handle back to a concrete metric kind.
///
/// Returns `None` when the handle holds a different kind; there is no
/// implicit coercion.
pub fn downcast<M: Metric>(metric: Arc<dyn Metric>) -> Option<Arc<M>> {
    metric.as_any_arc().downcast::<M>().ok()
}

/// Identity of a metric handle, independent of any registry name.
///
/// Derived from the `Arc` data pointer: clones of one handle compare equal,
/// distinct instances never do. Used for arbiter set membership so a handle
/// referenced under several names still ticks once per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricId(usize);

impl MetricId {
    pub fn of(metric: &Arc<dyn Metric>) -> Self {
        Self(Arc::as_ptr(metric) as *const () as usize)
    }
}

/// Argument to `get_or_register`: a ready handle or a lazy constructor.
///
/// The constructor form is invoked at most once, inside the registry's
/// atomicity boundary, so racing callers can never each install a distinct
/// instance for the same name.
pub enum MetricSource {
    Ready(Arc<dyn Metric>),
    Lazy(Box<dyn FnOnce() -> Arc<dyn Metric> + Send>),
}

impl MetricSource {
    pub fn ready(metric: Arc<dyn Metric>) -> Self {
        Self::Ready(metric)
    }

    pub fn lazy<M, F>(make: F) -> Self
    where
        M: Metric,
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Lazy(Box::new(move || Arc::new(make()) as Arc<dyn Metric>))
    }

    pub(crate) fn build(self) -> Arc<dyn Metric> {
        match self {
            Self::Ready(metric) => metric,
            Self::Lazy(make) => make(),
        }
    }
}

impl<M: Metric> From<Arc<M>> for MetricSource {
    fn from(metric: Arc<M>) -> Self {
        Self::Ready(metric)
    }
}

impl From<Arc<dyn Metric>> for MetricSource {
    fn from(metric: Arc<dyn Metric>) -> Self {
        Self::Ready(metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_id_identity() {
        let a: Arc<dyn Metric> = Counter::new();
        let b: Arc<dyn Metric> = Counter::new();

        assert_eq!(MetricId::of(&a), MetricId::of(&a.clone()));
        assert_ne!(MetricId::of(&a), MetricId::of(&b));
    }

    #[test]
    fn test_downcast() {
        let handle: Arc<dyn Metric> = Counter::new();
        assert!(downcast::<Counter>(handle.clone()).is_some());
        assert!(downcast::<Gauge>(handle).is_none());
    }

    #[test]
    fn test_lazy_source_builds_once_called() {
        let source = MetricSource::lazy(Counter::default);
        let metric = source.build();
        assert!(downcast::<Counter>(metric).is_some());
    }
}
