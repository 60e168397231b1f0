//! Busy-time tracking and windowed utilization.
//!
//! A [`BusyTracker`] is an absolute, monotonically growing counter of time
//! spent doing work. Hosts bump it around their work units; a
//! [`UtilizationSampler`] turns it into a busy fraction per sampling window
//! by diffing consecutive readings against wall-clock time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::MetricResult;
use crate::source::MetricSource;

/// Shared absolute busy-time counter.
///
/// Cloning is cheap and every clone observes the same counter, so a tracker
/// can be handed to worker threads while a sampler reads it.
#[derive(Debug, Clone, Default)]
pub struct BusyTracker {
    busy_nanos: Arc<AtomicU64>,
}

impl BusyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `busy` to the counter.
    pub fn record_busy(&self, busy: Duration) {
        let nanos = u64::try_from(busy.as_nanos()).unwrap_or(u64::MAX);
        self.busy_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    /// Start timing a unit of work. The elapsed time is recorded when the
    /// guard drops.
    pub fn enter(&self) -> BusyGuard<'_> {
        BusyGuard {
            tracker: self,
            started: Instant::now(),
        }
    }

    /// Total busy time recorded so far.
    pub fn total_busy(&self) -> Duration {
        Duration::from_nanos(self.busy_nanos.load(Ordering::Relaxed))
    }

    /// A sampler whose first window starts now.
    pub fn sampler(&self) -> UtilizationSampler {
        UtilizationSampler::with_baseline(self.clone(), Instant::now())
    }
}

/// Records the time between its creation and drop into a [`BusyTracker`].
#[must_use = "busy time is recorded when the guard is dropped"]
pub struct BusyGuard<'a> {
    tracker: &'a BusyTracker,
    started: Instant,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.tracker.record_busy(self.started.elapsed());
    }
}

/// Busy fraction of a [`BusyTracker`] since the previous sample.
#[derive(Debug)]
pub struct UtilizationSampler {
    tracker: BusyTracker,
    last_busy: Duration,
    last_at: Instant,
}

impl UtilizationSampler {
    /// Create a sampler whose first window starts at `at`.
    pub fn with_baseline(tracker: BusyTracker, at: Instant) -> Self {
        let last_busy = tracker.total_busy();
        Self {
            tracker,
            last_busy,
            last_at: at,
        }
    }

    /// Close the current window at `now` and return its busy fraction in
    /// `[0, 1]`. The next window starts at `now`.
    pub fn sample_at(&mut self, now: Instant) -> f64 {
        let busy = self.tracker.total_busy();
        let busy_delta = busy.saturating_sub(self.last_busy);
        let window = now.saturating_duration_since(self.last_at);

        self.last_busy = busy;
        self.last_at = now;

        let utilization = ratio(busy_delta, window).min(1.0);
        trace!(
            busy_ms = busy_delta.as_secs_f64() * 1000.0,
            window_ms = window.as_secs_f64() * 1000.0,
            utilization,
            "busy utilization sampled"
        );
        utilization
    }
}

impl MetricSource for UtilizationSampler {
    fn sample(&mut self) -> MetricResult<f64> {
        Ok(self.sample_at(Instant::now()))
    }

    fn name(&self) -> &str {
        "busy_utilization"
    }
}

/// `busy / window`, or zero for an empty window.
pub(crate) fn ratio(busy: Duration, window: Duration) -> f64 {
    if window.is_zero() {
        return 0.0;
    }
    busy.as_secs_f64() / window.as_secs_f64()
}
