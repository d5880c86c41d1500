//! Transfer progress shared between a download and its observer.

use std::sync::atomic::{AtomicU64, Ordering};

/// Byte counters written by the transfer and read by the observer
#[derive(Debug, Default)]
pub struct TransferProgress {
    transferred: AtomicU64,
    total: AtomicU64,
}

impl TransferProgress {
    /// Start with an expected total, 0 when unknown
    pub fn new(expected_total: u64) -> Self {
        Self {
            transferred: AtomicU64::new(0),
            total: AtomicU64::new(expected_total),
        }
    }

    pub fn add(&self, bytes: u64) {
        self.transferred.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            transferred: self.transferred.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub transferred: u64,
    /// Expected size in bytes, 0 when the server did not announce one
    pub total: u64,
}

impl ProgressSnapshot {
    /// Completion in percent, 0.0 when the total is unknown
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.transferred as f64 / self.total as f64
        }
    }
}

impl std::fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "transferred {} / {} bytes ({:.2}%)",
            self.transferred,
            self.total,
            self.percent()
        )
    }
}
