//! Background ticker for rate-based metrics
//!
//! The arbiter owns the set of tickable metric handles and a dedicated
//! thread that advances each of them at a fixed period, so moving rates
//! stay current even when no reader is polling. Registries hand tickable
//! metrics to an arbiter as a registration side effect; the tick pass runs
//! independently of every registry lock.

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ArbiterConfig;
use crate::metric::{Metric, MetricId};

/// Default period between tick passes.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(5);

/// Process-wide arbiter, shared by every registry that does not supply its
/// own. Its ticker runs for the lifetime of the process once started.
static GLOBAL: Lazy<Arc<Arbiter>> =
    Lazy::new(|| Arc::new(Arbiter::with_period(DEFAULT_TICK_PERIOD)));

struct Inner {
    /// Keyed by handle identity: a metric referenced under several names
    /// still ticks once per pass.
    tickables: DashMap<MetricId, Arc<dyn Metric>>,
    period: Duration,
}

/// Schedules periodic ticks over the registered tickable metrics.
///
/// The ticker thread starts lazily on the first `add` and keeps running
/// while the set is empty; an idle pass is cheap. Instance arbiters stop
/// their thread when dropped, so tests can construct isolated arbiters
/// without leaking threads.
pub struct Arbiter {
    inner: Arc<Inner>,
    // Sender half of the ticker's timer channel; dropping it stops the
    // thread on its next wakeup.
    ticker: Mutex<Option<Sender<()>>>,
}

impl Arbiter {
    /// Arbiter ticking at the given period.
    pub fn with_period(period: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                tickables: DashMap::new(),
                period,
            }),
            ticker: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ArbiterConfig) -> Self {
        Self::with_period(config.tick_interval())
    }

    /// The process-wide instance.
    pub fn global() -> &'static Arc<Arbiter> {
        &GLOBAL
    }

    /// Track a metric for periodic ticking. Idempotent for clones of the
    /// same handle.
    pub fn add(&self, metric: &Arc<dyn Metric>) {
        self.inner
            .tickables
            .insert(MetricId::of(metric), metric.clone());
        self.ensure_started();
    }

    /// Stop tracking a metric. A tick already in flight for it may still
    /// complete; that is harmless.
    pub fn remove(&self, metric: &Arc<dyn Metric>) {
        self.inner.tickables.remove(&MetricId::of(metric));
    }

    /// Number of currently tracked tickable metrics.
    pub fn tickable_count(&self) -> usize {
        self.inner.tickables.len()
    }

    fn ensure_started(&self) {
        let mut ticker = self.ticker.lock();
        if ticker.is_some() {
            return;
        }

        let (tx, rx) = channel::bounded::<()>(0);
        let inner = self.inner.clone();
        let period = self.inner.period;

        // recv_timeout doubles as the periodic timer and the shutdown
        // signal: the channel disconnects when the arbiter is dropped.
        let spawned = thread::Builder::new()
            .name("meterhub-arbiter".into())
            .spawn(move || loop {
                match rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => tick_all(&inner),
                    _ => break,
                }
            });

        match spawned {
            Ok(_) => {
                info!(period_secs = period.as_secs_f64(), "Arbiter ticker started");
                *ticker = Some(tx);
            }
            Err(e) => {
                // Metrics keep counting without a ticker; rates just stall.
                warn!(error = %e, "Failed to spawn arbiter ticker thread");
            }
        }
    }
}

/// Tick every currently tracked metric over a point-in-time snapshot.
///
/// A panicking tick is confined to its own metric; the pass continues with
/// the remaining members.
fn tick_all(inner: &Inner) {
    let snapshot: Vec<Arc<dyn Metric>> = inner
        .tickables
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    for metric in snapshot {
        if let Some(tickable) = metric.as_tickable() {
            if catch_unwind(AssertUnwindSafe(|| tickable.tick())).is_err() {
                warn!("Tickable metric panicked during tick; skipping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{Counter, Meter};

    #[test]
    fn test_add_remove_tracks_count() {
        let arbiter = Arbiter::with_period(Duration::from_secs(60));
        let meter: Arc<dyn Metric> = Meter::new();

        arbiter.add(&meter);
        assert_eq!(arbiter.tickable_count(), 1);

        // Adding a clone of the same handle is a no-op
        arbiter.add(&meter.clone());
        assert_eq!(arbiter.tickable_count(), 1);

        arbiter.remove(&meter);
        assert_eq!(arbiter.tickable_count(), 0);

        // Removing an untracked handle is a no-op
        arbiter.remove(&meter);
        assert_eq!(arbiter.tickable_count(), 0);
    }

    #[test]
    fn test_from_config_sets_period() {
        let config = ArbiterConfig {
            tick_interval_secs: 2,
        };
        let arbiter = Arbiter::from_config(&config);
        assert_eq!(arbiter.inner.period, Duration::from_secs(2));
    }

    #[test]
    fn test_ticker_advances_meters() {
        let arbiter = Arbiter::with_period(Duration::from_millis(10));
        let meter = Meter::new();
        let handle: Arc<dyn Metric> = meter.clone();

        meter.mark(100);
        arbiter.add(&handle);

        thread::sleep(Duration::from_millis(100));
        assert!(meter.rate_per_sec() > 0.0);
    }

    #[test]
    fn test_non_tickable_in_snapshot_is_skipped() {
        // tick_all tolerates non-tickable handles even though registries
        // never add them
        let arbiter = Arbiter::with_period(Duration::from_secs(60));
        let counter: Arc<dyn Metric> = Counter::new();
        arbiter.inner
            .tickables
            .insert(MetricId::of(&counter), counter.clone());

        tick_all(&arbiter.inner);
    }
}
