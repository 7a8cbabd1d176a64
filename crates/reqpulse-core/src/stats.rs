//! The concurrency-safe per-category statistics accumulator.
//!
//! One [`SampleAccumulator`] exists per monitored category and open
//! interval. It is shared by every concurrent dispatch for that category
//! and mutated only through its four operations; all of them take a single
//! short critical section, so snapshots never observe a half-applied
//! update and no caller blocks unboundedly.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Frozen totals copied out of a [`SampleAccumulator`].
///
/// Invariants maintained by the accumulator:
/// - `total_completions <= total_hits`
/// - `min <= max` once both are set (`min` starts as `None`, not zero,
///   so the first observation is never compared against a false minimum)
/// - `sum_of_squares` is accumulated in `u128` nanoseconds so squaring any
///   representable duration cannot overflow within an interval
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Count of request starts observed.
    pub total_hits: u64,
    /// Count of successful completions.
    pub total_completions: u64,
    /// Sum of observed durations.
    pub sum: Duration,
    /// Sum of squared durations in nanoseconds, for variance derivation.
    pub sum_of_squares: u128,
    /// Smallest observed duration, `None` until the first completion.
    pub min: Option<Duration>,
    /// Largest observed duration.
    pub max: Duration,
    /// Live in-flight request count.
    pub current_threads: u32,
    /// High-water mark of in-flight requests within the interval.
    pub max_concurrent_threads: u32,
}

impl Totals {
    /// Whether the interval saw any activity at all.
    pub fn is_active(&self) -> bool {
        self.sum > Duration::ZERO
            || self.total_completions > 0
            || self.total_hits > 0
            || self.max_concurrent_threads > 0
    }
}

/// Running totals for one monitored category.
///
/// Safe to update from unboundedly many threads; updates are applied
/// exactly once regardless of interleaving.
#[derive(Debug, Default)]
pub struct SampleAccumulator {
    totals: Mutex<Totals>,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a request entered dispatch.
    pub fn record_start(&self) {
        let mut totals = self.lock();
        totals.total_hits += 1;
        totals.current_threads += 1;
        totals.max_concurrent_threads =
            totals.max_concurrent_threads.max(totals.current_threads);
    }

    /// Record a successful completion with its observed duration.
    pub fn record_completion(&self, duration: Duration) {
        let nanos = duration.as_nanos();
        let mut totals = self.lock();
        totals.current_threads = totals.current_threads.saturating_sub(1);
        totals.total_completions += 1;
        totals.sum += duration;
        totals.sum_of_squares += nanos * nanos;
        totals.max = totals.max.max(duration);
        totals.min = Some(match totals.min {
            Some(min) => min.min(duration),
            None => duration,
        });
    }

    /// Record that a request left dispatch without completing.
    ///
    /// Adjusts concurrency bookkeeping only; completion counts and duration
    /// sums stay untouched so a failed request never skews throughput or
    /// latency statistics.
    pub fn record_failure(&self) {
        let mut totals = self.lock();
        totals.current_threads = totals.current_threads.saturating_sub(1);
    }

    /// Copy the current totals.
    ///
    /// Atomic with respect to concurrent updates: a racing record call is
    /// observed either fully applied or not at all.
    pub fn snapshot(&self) -> Totals {
        self.lock().clone()
    }

    /// Close the current interval, returning its totals and starting fresh.
    ///
    /// In-flight requests carry over: `current_threads` survives the roll
    /// and seeds the new interval's concurrency high-water mark.
    pub fn roll(&self) -> Totals {
        let mut totals = self.lock();
        let closed = totals.clone();
        *totals = Totals {
            current_threads: closed.current_threads,
            max_concurrent_threads: closed.current_threads,
            ..Totals::default()
        };
        closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Totals> {
        // A poisoned lock only means a panic mid-update on another thread;
        // the totals themselves are always internally consistent.
        self.totals.lock().unwrap_or_else(|e| e.into_inner())
    }
}
