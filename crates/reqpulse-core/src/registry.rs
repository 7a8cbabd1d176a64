//! Monitored categories and the process-wide category registry.

use crate::snapshot::IntervalSnapshot;
use crate::stats::SampleAccumulator;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Immutable key identifying a logical endpoint or resource being timed.
///
/// Cheap to clone; many concurrent requests map to one category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitoredCategory(Arc<str>);

impl MonitoredCategory {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonitoredCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MonitoredCategory {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Process-wide store mapping categories to their accumulators.
///
/// Owned by a single composition root: populated on first dispatch per
/// category, queried by the emitter bridge, and pruned through an explicit
/// [`remove`](Self::remove) call when the backing resource is known to be
/// gone. Nothing is evicted automatically.
#[derive(Debug, Default)]
pub struct CategoryRegistry {
    categories: DashMap<MonitoredCategory, Arc<SampleAccumulator>>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulator for a category, created on first use.
    pub fn accumulator(&self, category: &MonitoredCategory) -> Arc<SampleAccumulator> {
        self.categories
            .entry(category.clone())
            .or_default()
            .clone()
    }

    /// Derive a snapshot of a category's current totals without resetting
    /// them. `None` when the category was never dispatched.
    pub fn snapshot(
        &self,
        category: &MonitoredCategory,
        interval_start: SystemTime,
        interval_end: SystemTime,
    ) -> Option<IntervalSnapshot> {
        self.categories.get(category).map(|acc| {
            IntervalSnapshot::derive(
                category.clone(),
                &acc.snapshot(),
                interval_start,
                interval_end,
            )
        })
    }

    /// Categories whose open interval has seen any activity.
    pub fn active_categories(&self) -> Vec<MonitoredCategory> {
        self.categories
            .iter()
            .filter(|entry| entry.value().snapshot().is_active())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Close the open interval of every category, returning snapshots for
    /// the active ones. Each accumulator is rolled atomically; in-flight
    /// requests carry their concurrency bookkeeping into the new interval.
    pub fn roll_interval(
        &self,
        interval_start: SystemTime,
        interval_end: SystemTime,
    ) -> Vec<IntervalSnapshot> {
        self.categories
            .iter()
            .filter_map(|entry| {
                let totals = entry.value().roll();
                totals.is_active().then(|| {
                    IntervalSnapshot::derive(
                        entry.key().clone(),
                        &totals,
                        interval_start,
                        interval_end,
                    )
                })
            })
            .collect()
    }

    /// Evict a category whose backing resource is gone.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&self, category: &MonitoredCategory) -> bool {
        self.categories.remove(category).is_some()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn interval() -> (SystemTime, SystemTime) {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        (start, start + Duration::from_secs(30))
    }

    #[test]
    fn accumulator_is_shared_per_category() {
        let registry = CategoryRegistry::new();
        let orders = MonitoredCategory::new("GET /orders");

        let a = registry.accumulator(&orders);
        let b = registry.accumulator(&orders);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_of_unknown_category_is_none() {
        let registry = CategoryRegistry::new();
        let (start, end) = interval();
        assert!(registry
            .snapshot(&MonitoredCategory::new("GET /nowhere"), start, end)
            .is_none());
    }

    #[test]
    fn active_categories_excludes_idle_ones() {
        let registry = CategoryRegistry::new();
        let busy = MonitoredCategory::new("GET /busy");
        let idle = MonitoredCategory::new("GET /idle");

        let acc = registry.accumulator(&busy);
        acc.record_start();
        acc.record_completion(Duration::from_millis(3));
        registry.accumulator(&idle);

        assert_eq!(registry.active_categories(), vec![busy]);
    }

    #[test]
    fn roll_interval_resets_and_reports_active_only() {
        let registry = CategoryRegistry::new();
        let busy = MonitoredCategory::new("POST /orders");
        registry.accumulator(&idle_category());

        let acc = registry.accumulator(&busy);
        acc.record_start();
        acc.record_completion(Duration::from_millis(12));

        let (start, end) = interval();
        let snapshots = registry.roll_interval(start, end);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].category, busy);
        assert_eq!(snapshots[0].total_completions, 1);

        // Next roll sees a fresh interval.
        assert!(registry.roll_interval(start, end).is_empty());
    }

    #[test]
    fn remove_evicts_explicitly() {
        let registry = CategoryRegistry::new();
        let gone = MonitoredCategory::new("GET /gone");
        registry.accumulator(&gone);

        assert!(registry.remove(&gone));
        assert!(!registry.remove(&gone));
        assert!(registry.is_empty());
    }

    fn idle_category() -> MonitoredCategory {
        MonitoredCategory::new("GET /health")
    }
}
