//! Event-rate meter
//!
//! Counts marked events and keeps an exponentially smoothed per-second rate.
//! The rate only moves when the arbiter calls `tick`, once per period, so it
//! stays current without any reader polling.

use std::any::Any;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{Metric, Tickable};
use crate::arbiter::DEFAULT_TICK_PERIOD;

/// Smoothing factor applied to each new per-period observation.
const ALPHA: f64 = 0.3;

/// Throughput meter with a smoothed events-per-second rate.
///
/// Each tick is assumed to cover the period the meter was built with
/// (`DEFAULT_TICK_PERIOD` unless `with_tick_period` says otherwise); a
/// meter driven by an arbiter with a custom `ArbiterConfig` interval should
/// be built with that same period or its per-second rate is scaled by the
/// mismatch.
#[derive(Debug)]
pub struct Meter {
    count: AtomicI64,
    uncounted: AtomicI64,
    // f64 bits; the rate is read and written whole, never mixed
    rate_bits: AtomicU64,
    tick_secs: f64,
}

impl Default for Meter {
    fn default() -> Self {
        Self {
            count: AtomicI64::new(0),
            uncounted: AtomicI64::new(0),
            rate_bits: AtomicU64::new(0),
            tick_secs: DEFAULT_TICK_PERIOD.as_secs_f64(),
        }
    }
}

impl Meter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Meter whose rate normalization matches a non-default tick period.
    pub fn with_tick_period(period: Duration) -> Arc<Self> {
        Arc::new(Self::for_period(period))
    }

    pub(crate) fn for_period(period: Duration) -> Self {
        Self {
            tick_secs: period.as_secs_f64(),
            ..Self::default()
        }
    }

    /// Record `n` events.
    #[inline]
    pub fn mark(&self, n: i64) {
        self.count.fetch_add(n, Ordering::Relaxed);
        self.uncounted.fetch_add(n, Ordering::Relaxed);
    }

    /// Total events marked since creation.
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Smoothed events-per-second rate as of the last tick.
    pub fn rate_per_sec(&self) -> f64 {
        f64::from_bits(self.rate_bits.load(Ordering::Relaxed))
    }
}

impl Tickable for Meter {
    fn tick(&self) {
        let marked = self.uncounted.swap(0, Ordering::Relaxed);
        let instant = marked as f64 / self.tick_secs;
        let previous = self.rate_per_sec();
        let smoothed = previous + ALPHA * (instant - previous);
        self.rate_bits.store(smoothed.to_bits(), Ordering::Relaxed);
    }
}

impl Metric for Meter {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_counts_marks() {
        let meter = Meter::new();
        meter.mark(3);
        meter.mark(2);
        assert_eq!(meter.count(), 5);
    }

    #[test]
    fn test_tick_advances_rate() {
        let meter = Meter::new();
        assert_eq!(meter.rate_per_sec(), 0.0);

        meter.mark(50);
        meter.tick();
        assert!(meter.rate_per_sec() > 0.0);

        // With no further marks the rate decays toward zero
        let after_first = meter.rate_per_sec();
        meter.tick();
        assert!(meter.rate_per_sec() < after_first);
    }

    #[test]
    fn test_rate_normalizes_to_tick_period() {
        // 100 marks over a 1s period smooth to 0.3 * 100/1
        let fast = Meter::with_tick_period(Duration::from_secs(1));
        fast.mark(100);
        fast.tick();
        assert!((fast.rate_per_sec() - 30.0).abs() < 1e-9);

        // The same marks over the default 5s period read five times lower
        let default = Meter::new();
        default.mark(100);
        default.tick();
        assert!((default.rate_per_sec() - 6.0).abs() < 1e-9);
    }
}
