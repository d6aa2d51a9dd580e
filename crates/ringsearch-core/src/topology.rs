//! Ring construction.
//!
//! Builds `N + 1` links forming a single cycle and hands every unit exactly
//! its own two ends:
//!
//! ```text
//!            edge 0          edge 1                 edge N-1           edge N
//! coordinator ─────► worker 1 ─────► worker 2 ··· ──────────► worker N ─────► coordinator
//! ```
//!
//! Construction is incremental: the coordinator's outbound link is created
//! first, each worker then takes the pending upstream end plus a fresh link
//! whose write end becomes its downstream, and the last pending upstream end
//! closes the cycle at the coordinator. Ends are moved, never shared, so a
//! unit dropping its [`Downstream`] is observed as end-of-stream by its
//! neighbour.

use crate::{
    config::RingConfig,
    error::TopologyError,
    link::{Downstream, EdgeId, Upstream, link},
};

/// Ordinal of the coordinator.
pub const COORDINATOR: usize = 0;

/// The two link ends owned by one unit.
#[derive(Debug)]
pub struct UnitLinks {
    /// 0 for the coordinator, `1..=N` for workers in creation order
    pub ordinal: usize,
    /// End this unit reads from
    pub upstream: Upstream,
    /// End this unit writes to
    pub downstream: Downstream,
}

/// A fully wired ring, not yet running.
#[derive(Debug)]
pub struct Topology {
    coordinator: UnitLinks,
    workers: Vec<UnitLinks>,
}

impl Topology {
    /// Wire a ring of `config.workers` workers plus the coordinator.
    ///
    /// # Errors
    ///
    /// - `TopologyError::TooManyWorkers` if the worker count exceeds
    ///   `config.max_workers`
    pub fn build(config: &RingConfig) -> Result<Self, TopologyError> {
        let requested = config.workers.get();
        if requested > config.max_workers {
            return Err(TopologyError::TooManyWorkers { requested, max: config.max_workers });
        }

        let (coordinator_downstream, mut pending_upstream) = link(EdgeId(COORDINATOR));

        let mut workers = Vec::with_capacity(requested);
        for ordinal in 1..=requested {
            let (downstream, next_upstream) = link(EdgeId(ordinal));
            workers.push(UnitLinks { ordinal, upstream: pending_upstream, downstream });
            pending_upstream = next_upstream;
        }

        let coordinator = UnitLinks {
            ordinal: COORDINATOR,
            upstream: pending_upstream,
            downstream: coordinator_downstream,
        };

        tracing::debug!(workers = requested, edges = requested + 1, "ring wired");

        Ok(Self { coordinator, workers })
    }

    /// Coordinator's link ends.
    pub fn coordinator(&self) -> &UnitLinks {
        &self.coordinator
    }

    /// Worker link ends in ordinal order.
    pub fn worker_links(&self) -> &[UnitLinks] {
        &self.workers
    }

    /// Split into the coordinator's ends and the workers' ends.
    pub fn into_parts(self) -> (UnitLinks, Vec<UnitLinks>) {
        (self.coordinator, self.workers)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::message::Message;

    fn config(workers: usize) -> RingConfig {
        RingConfig::new(NonZeroUsize::new(workers).unwrap())
    }

    #[test]
    fn ordinals_follow_creation_order() {
        let topology = Topology::build(&config(4)).unwrap();

        assert_eq!(topology.coordinator().ordinal, COORDINATOR);
        let ordinals: Vec<_> = topology.worker_links().iter().map(|l| l.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);
    }

    #[test]
    fn single_worker_ring() {
        let topology = Topology::build(&config(1)).unwrap();
        let worker = &topology.worker_links()[0];

        assert_eq!(topology.coordinator().downstream.edge(), worker.upstream.edge());
        assert_eq!(worker.downstream.edge(), topology.coordinator().upstream.edge());
    }

    #[test]
    fn rejects_worker_count_over_limit() {
        let mut cfg = config(5);
        cfg.max_workers = 4;

        assert_eq!(
            Topology::build(&cfg).unwrap_err(),
            TopologyError::TooManyWorkers { requested: 5, max: 4 }
        );
    }

    #[tokio::test]
    async fn message_travels_the_whole_cycle() {
        let (mut coordinator, workers) = Topology::build(&config(3)).unwrap().into_parts();

        coordinator.downstream.send(&Message::NotFound).unwrap();
        for mut worker in workers {
            let message = worker.upstream.recv().await.unwrap();
            worker.downstream.send(&message).unwrap();
        }

        assert_eq!(coordinator.upstream.recv().await.unwrap(), Message::NotFound);
    }
}
