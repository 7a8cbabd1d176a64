//! Interval snapshot derivation.
//!
//! A snapshot is an immutable, read-only view derived on demand from a
//! category's frozen [`Totals`]; it is handed to a sink and then discarded.

use crate::registry::MonitoredCategory;
use crate::stats::Totals;
use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Point-in-time metrics for one category over one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSnapshot {
    /// The monitored category the totals belong to.
    pub category: MonitoredCategory,
    /// Request starts observed in the interval.
    pub total_hits: u64,
    /// Successful completions in the interval.
    pub total_completions: u64,
    /// Mean duration over completions; zero when nothing completed.
    pub average_duration: Duration,
    /// Population standard deviation of durations; zero below two samples.
    pub std_deviation: Duration,
    /// Smallest completed duration, absent when nothing completed.
    pub min_duration: Option<Duration>,
    /// Largest completed duration.
    pub max_duration: Duration,
    /// Completions per second over the interval; zero for degenerate
    /// intervals (clock-skew guard).
    pub throughput: f64,
    /// High-water mark of in-flight requests.
    pub max_concurrent_threads: u32,
    /// Whether the interval saw any activity.
    pub is_active: bool,
    /// Hour of the interval start, local time.
    pub hour: u32,
    /// Minute of the interval start, local time.
    pub minute: u32,
    /// Wall-clock bounds of the interval.
    pub interval_start: SystemTime,
    pub interval_end: SystemTime,
}

impl IntervalSnapshot {
    /// Derive a snapshot from frozen totals and the interval bounds.
    ///
    /// Pure: every division is guarded, so an empty interval yields zeros
    /// rather than a fault.
    pub fn derive(
        category: MonitoredCategory,
        totals: &Totals,
        interval_start: SystemTime,
        interval_end: SystemTime,
    ) -> Self {
        let local: DateTime<Local> = interval_start.into();

        Self {
            category,
            total_hits: totals.total_hits,
            total_completions: totals.total_completions,
            average_duration: average_duration(totals),
            std_deviation: std_deviation(totals),
            min_duration: totals.min,
            max_duration: totals.max,
            throughput: throughput(totals, interval_start, interval_end),
            max_concurrent_threads: totals.max_concurrent_threads,
            is_active: totals.is_active(),
            hour: local.hour(),
            minute: local.minute(),
            interval_start,
            interval_end,
        }
    }
}

fn average_duration(totals: &Totals) -> Duration {
    if totals.total_completions == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos((totals.sum.as_nanos() / u128::from(totals.total_completions)) as u64)
}

fn std_deviation(totals: &Totals) -> Duration {
    if totals.total_completions < 2 {
        return Duration::ZERO;
    }
    let n = totals.total_completions as f64;
    let sum = totals.sum.as_nanos() as f64;
    let mean = sum / n;
    let variance = (totals.sum_of_squares as f64 / n - mean * mean).max(0.0);
    Duration::from_nanos(variance.sqrt() as u64)
}

fn throughput(totals: &Totals, start: SystemTime, end: SystemTime) -> f64 {
    let length = match end.duration_since(start) {
        Ok(length) if !length.is_zero() => length,
        // Zero-length or backwards interval: the clock moved under us.
        _ => return 0.0,
    };
    totals.total_completions as f64 / length.as_secs_f64()
}
