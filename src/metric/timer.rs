//! Duration timer
//!
//! Pairs a meter (throughput) with a histogram (latency distribution).
//! Tickable through its meter.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use super::{Histogram, Meter, Metric, Tickable};

/// Records how often and how long an operation takes.
#[derive(Debug, Default)]
pub struct Timer {
    meter: Meter,
    histogram: Histogram,
}

impl Timer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Timer whose rate normalization matches a non-default tick period.
    pub fn with_tick_period(period: Duration) -> Arc<Self> {
        Arc::new(Self {
            meter: Meter::for_period(period),
            histogram: Histogram::default(),
        })
    }

    /// Record one completed operation.
    #[inline]
    pub fn record(&self, elapsed: Duration) {
        self.histogram.record(elapsed.as_nanos() as i64);
        self.meter.mark(1);
    }

    /// Time a closure and record its duration.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let start = std::time::Instant::now();
        let result = f();
        self.record(start.elapsed());
        result
    }

    pub fn count(&self) -> i64 {
        self.meter.count()
    }

    /// Smoothed operations-per-second rate as of the last tick.
    pub fn rate_per_sec(&self) -> f64 {
        self.meter.rate_per_sec()
    }

    /// Mean recorded duration.
    pub fn mean(&self) -> Duration {
        Duration::from_nanos(self.histogram.mean().max(0.0) as u64)
    }

    pub fn max(&self) -> Duration {
        Duration::from_nanos(self.histogram.max().max(0) as u64)
    }

    pub fn min(&self) -> Duration {
        Duration::from_nanos(self.histogram.min().max(0) as u64)
    }
}

impl Tickable for Timer {
    fn tick(&self) {
        self.meter.tick();
    }
}

impl Metric for Timer {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_tickable(&self) -> Option<&dyn Tickable> {
        Some(self)
    }
}
