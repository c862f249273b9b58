//! Delivery metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Total events accepted by the backend
    stored_count: AtomicU64,
    /// Total backend-reported failures
    failed_count: AtomicU64,
    /// Total delegations to the fallback sink
    fallback_count: AtomicU64,
    /// Total events dropped with the chain exhausted at this sink
    dropped_count: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get stored count
    pub fn stored_count(&self) -> u64 {
        self.stored_count.load(Ordering::Relaxed)
    }

    /// Increment stored count
    pub fn inc_stored_count(&self) {
        self.stored_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failed_count(&self) -> u64 {
        self.failed_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failed_count(&self) {
        self.failed_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get fallback delegation count
    pub fn fallback_count(&self) -> u64 {
        self.fallback_count.load(Ordering::Relaxed)
    }

    /// Increment fallback delegation count
    pub fn inc_fallback_count(&self) {
        self.fallback_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped count
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Increment dropped count
    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            stored_count: self.stored_count(),
            failed_count: self.failed_count(),
            fallback_count: self.fallback_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub stored_count: u64,
    pub failed_count: u64,
    pub fallback_count: u64,
    pub dropped_count: u64,
}

/// Metrics for the dispatch pool
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Current task queue length
    queue_len: AtomicUsize,
    /// Total accepted submissions
    submitted_count: AtomicU64,
    /// Total submissions rejected at capacity
    rejected_count: AtomicU64,
}

impl PoolMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current queue length
    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    /// Set current queue length
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get submitted count
    pub fn submitted_count(&self) -> u64 {
        self.submitted_count.load(Ordering::Relaxed)
    }

    /// Increment submitted count
    pub fn inc_submitted_count(&self) {
        self.submitted_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get rejected count
    pub fn rejected_count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    /// Increment rejected count
    pub fn inc_rejected_count(&self) {
        self.rejected_count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Metrics for the router entry point
#[derive(Debug, Default)]
pub struct RouterMetrics {
    /// Total events routed to a sink
    routed_count: AtomicU64,
    /// Total events dropped by the disabled-category filter
    filtered_count: AtomicU64,
}

impl RouterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get routed count
    pub fn routed_count(&self) -> u64 {
        self.routed_count.load(Ordering::Relaxed)
    }

    /// Increment routed count
    pub fn inc_routed_count(&self) {
        self.routed_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get filtered count
    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    /// Increment filtered count
    pub fn inc_filtered_count(&self) {
        self.filtered_count.fetch_add(1, Ordering::Relaxed);
    }
}
