//! Ring configuration.

use std::num::NonZeroUsize;

/// Default upper bound on the number of workers.
pub const DEFAULT_MAX_WORKERS: usize = 4096;

/// Ring configuration
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Number of workers on the ring, not counting the coordinator
    pub workers: NonZeroUsize,
    /// Largest worker count the topology will build
    pub max_workers: usize,
}

impl RingConfig {
    /// Configuration for `workers` workers with default limits.
    pub fn new(workers: NonZeroUsize) -> Self {
        Self { workers, max_workers: DEFAULT_MAX_WORKERS }
    }
}
