//! Atomic summary histogram
//!
//! Tracks count, sum, min, and max of recorded samples. Not tickable; it
//! carries no time-windowed state.

use std::any::Any;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use super::Metric;

/// Summary statistics over recorded sample values.
#[derive(Debug)]
pub struct Histogram {
    count: AtomicI64,
    sum: AtomicI64,
    min: AtomicI64,
    max: AtomicI64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            count: AtomicI64::new(0),
            sum: AtomicI64::new(0),
            min: AtomicI64::new(i64::MAX),
            max: AtomicI64::new(i64::MIN),
        }
    }
}

impl Histogram {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[inline]
    pub fn record(&self, value: i64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(value, Ordering::Relaxed);
        self.min.fetch_min(value, Ordering::Relaxed);
        self.max.fetch_max(value, Ordering::Relaxed);
    }

    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> i64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn min(&self) -> i64 {
        if self.count() == 0 {
            0
        } else {
            self.min.load(Ordering::Relaxed)
        }
    }

    pub fn max(&self) -> i64 {
        if self.count() == 0 {
            0
        } else {
            self.max.load(Ordering::Relaxed)
        }
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
        self.sum.store(0, Ordering::Relaxed);
        self.min.store(i64::MAX, Ordering::Relaxed);
        self.max.store(i64::MIN, Ordering::Relaxed);
    }
}

impl Metric for Histogram {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_stats() {
        let histogram = Histogram::new();
        assert_eq!(histogram.min(), 0);
        assert_eq!(histogram.max(), 0);

        histogram.record(10);
        histogram.record(2);
        histogram.record(6);

        assert_eq!(histogram.count(), 3);
        assert_eq!(histogram.sum(), 18);
        assert_eq!(histogram.min(), 2);
        assert_eq!(histogram.max(), 10);
        assert!((histogram.mean() - 6.0).abs() < f64::EPSILON);
    }
}
