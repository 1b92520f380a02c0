//! File manager I/O statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Block I/O counters kept by the [`FileManager`](crate::storage::FileManager).
///
/// All fields are atomic so concurrent readers and writers on different files
/// can bump them without sharing a lock. `Relaxed` ordering is enough: the
/// counters are independent and only need atomic increments.
///
/// # Example
/// ```
/// use stratadb::IoStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = IoStats::new();
/// stats.blocks_written.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().blocks_written, 1);
/// ```
#[derive(Debug, Default)]
pub struct IoStats {
    /// Number of blocks read from disk.
    pub blocks_read: AtomicU64,

    /// Number of blocks written over existing or new positions.
    pub blocks_written: AtomicU64,

    /// Number of zeroed blocks appended to extend a file.
    pub blocks_appended: AtomicU64,
}

impl IoStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self) {
        self.blocks_read.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.blocks_written.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_append(&self) {
        self.blocks_appended.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of the counters.
    pub fn snapshot(&self) -> IoStatsSnapshot {
        IoStatsSnapshot {
            blocks_read: self.blocks_read.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
            blocks_appended: self.blocks_appended.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of [`IoStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoStatsSnapshot {
    pub blocks_read: u64,
    pub blocks_written: u64,
    pub blocks_appended: u64,
}

impl fmt::Display for IoStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IoStats {{ read: {}, written: {}, appended: {} }}",
            self.blocks_read, self.blocks_written, self.blocks_appended
        )
    }
}
