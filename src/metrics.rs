//! Counters for relation operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::record::Direction;

/// Observer for relation index operations.
///
/// Implementations must not influence results; they only count what happened.
pub trait RelationMetrics: Send + Sync {
    /// Records a successful edge write.
    fn edge_written(&self, direction: Direction);

    /// Records that a neighbor scan was opened.
    fn neighbor_scan(&self, direction: Direction);

    /// Records a completed neighbor count and the rows it enumerated.
    fn neighbor_count(&self, direction: Direction, rows: u64);

    /// Records a call that failed in the collaborator store.
    fn store_failure(&self, direction: Direction);
}

/// Discards everything.
#[derive(Default)]
pub struct NoopMetrics;

impl RelationMetrics for NoopMetrics {
    fn edge_written(&self, _direction: Direction) {}
    fn neighbor_scan(&self, _direction: Direction) {}
    fn neighbor_count(&self, _direction: Direction, _rows: u64) {}
    fn store_failure(&self, _direction: Direction) {}
}

/// Relaxed atomic counters, one set per direction.
#[derive(Default)]
pub struct CounterMetrics {
    /// Edges written to the forward index.
    pub forward_writes: AtomicU64,
    /// Edges written to the reverse index.
    pub reverse_writes: AtomicU64,
    /// Scans opened on the forward index.
    pub forward_scans: AtomicU64,
    /// Scans opened on the reverse index.
    pub reverse_scans: AtomicU64,
    /// Counts run on the forward index.
    pub forward_counts: AtomicU64,
    /// Counts run on the reverse index.
    pub reverse_counts: AtomicU64,
    /// Rows enumerated by all counts.
    pub counted_rows: AtomicU64,
    /// Store failures observed in either direction.
    pub store_failures: AtomicU64,
}

impl CounterMetrics {
    /// Edge writes recorded for `direction`.
    pub fn writes(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Forward => self.forward_writes.load(Ordering::Relaxed),
            Direction::Reverse => self.reverse_writes.load(Ordering::Relaxed),
        }
    }

    /// Scans recorded for `direction`.
    pub fn scans(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Forward => self.forward_scans.load(Ordering::Relaxed),
            Direction::Reverse => self.reverse_scans.load(Ordering::Relaxed),
        }
    }
}

impl RelationMetrics for CounterMetrics {
    fn edge_written(&self, direction: Direction) {
        match direction {
            Direction::Forward => self.forward_writes.fetch_add(1, Ordering::Relaxed),
            Direction::Reverse => self.reverse_writes.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn neighbor_scan(&self, direction: Direction) {
        match direction {
            Direction::Forward => self.forward_scans.fetch_add(1, Ordering::Relaxed),
            Direction::Reverse => self.reverse_scans.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn neighbor_count(&self, direction: Direction, rows: u64) {
        match direction {
            Direction::Forward => self.forward_counts.fetch_add(1, Ordering::Relaxed),
            Direction::Reverse => self.reverse_counts.fetch_add(1, Ordering::Relaxed),
        };
        self.counted_rows.fetch_add(rows, Ordering::Relaxed);
    }

    fn store_failure(&self, _direction: Direction) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// Returns the default metrics sink, a [`NoopMetrics`].
pub fn default_metrics() -> Arc<dyn RelationMetrics> {
    Arc::new(NoopMetrics)
}
