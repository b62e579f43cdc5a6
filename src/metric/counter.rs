//! Atomic counter
//!
//! Lock-free signed counter, safe to update from any thread.

use std::any::Any;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use super::Metric;

/// Counts events; supports increment, decrement, and reset.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
}

impl Counter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[inline]
    pub fn inc(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    #[inline]
    pub fn dec(&self, delta: i64) {
        self.value.fetch_sub(delta, Ordering::Relaxed);
    }

    pub fn count(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

impl Metric for Counter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
