//! Key space partitioning.
//!
//! Worker `k` of `n` scans `[chunk * (k - 1), chunk * k)` with
//! `chunk = key_space / n`. The last worker's range ends at `key_space`
//! itself, absorbing the remainder of the division. Ranges may be empty when
//! `key_space < n`.

use std::{num::NonZeroUsize, ops::Range};

/// Half-open range of offsets assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    start: u64,
    end: u64,
}

impl Partition {
    /// Create a partition covering `[start, end)`.
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "partition start {start} past end {end}");
        Self { start, end }
    }

    /// Range for worker `ordinal` (1-based) out of `workers`.
    ///
    /// `ordinal` must lie in `1..=workers`.
    pub fn for_worker(key_space: u64, workers: NonZeroUsize, ordinal: usize) -> Self {
        debug_assert!(
            (1..=workers.get()).contains(&ordinal),
            "ordinal {ordinal} outside 1..={workers}"
        );

        let chunk = key_space / workers.get() as u64;
        let start = chunk * (ordinal as u64).saturating_sub(1);
        let end = if ordinal == workers.get() { key_space } else { chunk * ordinal as u64 };

        Self::new(start, end)
    }

    /// All partitions in worker order.
    pub fn split(key_space: u64, workers: NonZeroUsize) -> Vec<Self> {
        (1..=workers.get()).map(|ordinal| Self::for_worker(key_space, workers, ordinal)).collect()
    }

    /// First offset.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// One past the last offset.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of offsets.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns true if there is nothing to scan.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `offset` lies in this partition.
    pub fn contains(&self, offset: u64) -> bool {
        (self.start..self.end).contains(&offset)
    }

    /// Offsets in increasing order.
    pub fn offsets(&self) -> Range<u64> {
        self.start..self.end
    }
}
