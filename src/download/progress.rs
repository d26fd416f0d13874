//! Progress hook for byte-level transfer reporting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Receives byte counts as a download proceeds.
///
/// Implementations must be cheap and non-blocking: `on_bytes` is called from
/// every concurrent part task for every received chunk.
pub trait ProgressObserver: Send + Sync {
    /// Called once with the number of bytes the download expects to transfer.
    fn on_total(&self, total_bytes: u64);

    /// Called for each chunk received from the network.
    fn on_bytes(&self, bytes: u64);
}

/// Observer that only accumulates counts. Useful for tests and headless runs.
#[derive(Debug, Default)]
pub struct ByteCounter {
    total: AtomicU64,
    received: AtomicU64,
}

impl ByteCounter {
    /// Creates a counter with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expected total reported by the downloader.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Bytes received so far across all tasks.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }
}

impl ProgressObserver for ByteCounter {
    fn on_total(&self, total_bytes: u64) {
        self.total.store(total_bytes, Ordering::SeqCst);
    }

    fn on_bytes(&self, bytes: u64) {
        self.received.fetch_add(bytes, Ordering::SeqCst);
    }
}
