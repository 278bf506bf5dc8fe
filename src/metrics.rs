//! Observability port for rule-level counters.
//!
//! Every validation rule failure and classification decision point
//! increments a named counter. The sink is injected into each component so
//! the engine stays free of process-wide state and each component remains
//! independently testable.

use std::collections::HashMap;
use std::sync::Mutex;

/// A sink for named monotonic counters.
///
/// Implementations must be cheap to call; the engine increments counters on
/// hot per-participant paths.
pub trait MetricsSink: Send + Sync {
    /// Increments the named counter by one.
    fn increment(&self, counter: &str);
}

/// A sink that discards all counters.
///
/// Useful for callers that do not wire up dashboards, and as a default in
/// tests that don't assert on metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMetrics;

impl MetricsSink for NullMetrics {
    fn increment(&self, _counter: &str) {}
}

/// An in-memory sink that records counts for inspection.
///
/// # Example
///
/// ```
/// use vesting_engine::metrics::{InMemoryMetrics, MetricsSink};
///
/// let metrics = InMemoryMetrics::default();
/// metrics.increment("validation.amount_not_positive");
/// metrics.increment("validation.amount_not_positive");
/// assert_eq!(metrics.count("validation.amount_not_positive"), 2);
/// assert_eq!(metrics.count("validation.badge_not_found"), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counts: Mutex<HashMap<String, u64>>,
}

impl InMemoryMetrics {
    /// Returns the current value of the named counter, zero if never
    /// incremented.
    pub fn count(&self, counter: &str) -> u64 {
        self.counts
            .lock()
            .map(|counts| counts.get(counter).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts
            .lock()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }
}

impl MetricsSink for InMemoryMetrics {
    fn increment(&self, counter: &str) {
        if let Ok(mut counts) = self.counts.lock() {
            *counts.entry(counter.to_string()).or_insert(0) += 1;
        }
    }
}
