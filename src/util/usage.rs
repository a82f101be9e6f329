//! Cumulative usage tracking across rounds and turns.

use std::sync::{Arc, RwLock};

use crate::types::UsageStats;

/// Tracks cumulative token usage.
///
/// Cloning shares the underlying counters, so one tracker can be handed to
/// several executors.
#[derive(Clone, Debug)]
pub struct UsageTracker {
    inner: Arc<RwLock<UsageTrackerInner>>,
}

#[derive(Debug, Default)]
struct UsageTrackerInner {
    total_usage: UsageStats,
    generation_count: u64,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(UsageTrackerInner::default())),
        }
    }

    /// Record usage from one backend call.
    pub fn record(&self, usage: &UsageStats) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.total_usage.merge(usage);
        inner.generation_count += 1;
    }

    /// Get total usage.
    pub fn total_usage(&self) -> UsageStats {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .total_usage
            .clone()
    }

    /// Number of backend calls that reported usage.
    pub fn generation_count(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .generation_count
    }

    /// Reset all tracking.
    pub fn reset(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *inner = UsageTrackerInner::default();
    }
}
