//! Ring runtime.
//!
//! Wires the topology, spawns one task per worker and drives every unit's
//! state machine by executing its actions against real links. Scans run on
//! the blocking pool so a long partition never stalls the link reads of other
//! units.
//!
//! Workers are spawned in ordinal order and joined in reverse order once the
//! coordinator has its result. If the coordinator fails, the remaining
//! worker handles are dropped, which aborts their tasks.

use std::{collections::VecDeque, sync::Arc};

use ringsearch_crypto::{Decryptor, KeyTester, Plaintext};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::{
    config::RingConfig,
    error::{LinkError, RingError, UnitError},
    message::Message,
    partition::Partition,
    report::SearchReport,
    topology::{Topology, UnitLinks},
    unit::{Coordinator, RingUnit, UnitAction, UnitEvent, Worker},
};

/// A configured search, ready to run once.
#[derive(Debug)]
pub struct Ring<D> {
    config: RingConfig,
    tester: Arc<KeyTester<D>>,
}

impl<D: Decryptor + 'static> Ring<D> {
    /// Create a ring that will search `tester`'s key space.
    pub fn new(config: RingConfig, tester: KeyTester<D>) -> Self {
        Self { config, tester: Arc::new(tester) }
    }

    /// Run the search to completion.
    ///
    /// Returns once the result has travelled the whole ring and every worker
    /// has been joined.
    ///
    /// # Errors
    ///
    /// - `RingError::Topology` if the ring cannot be built
    /// - `RingError::Unit` if a state machine fails or the ring closes before
    ///   a result reaches the coordinator
    /// - `RingError::UnitFailed` if a worker panicked or was cancelled
    /// - `RingError::Confirm` if the reported key cannot be re-checked
    pub async fn run(self) -> Result<SearchReport, RingError> {
        let topology = Topology::build(&self.config)?;
        let key_space = self.tester.key_space().size();
        let workers = self.config.workers;

        tracing::info!(workers = workers.get(), key_space, "starting search");

        let (coordinator_links, worker_links) = topology.into_parts();

        let handles: Vec<WorkerHandle> = worker_links
            .into_iter()
            .map(|links| {
                let partition = Partition::for_worker(key_space, workers, links.ordinal);
                let worker = Worker::new(links.ordinal, partition);
                WorkerHandle::spawn(worker, links, Arc::clone(&self.tester))
            })
            .collect();

        let reported = drive(Coordinator::new(), coordinator_links, &self.tester)
            .instrument(tracing::info_span!("coordinator"))
            .await?;

        for handle in handles.into_iter().rev() {
            handle.join().await?;
        }

        let message = reported.ok_or(UnitError::RingBroken)?;
        report(&self.tester, message)
    }
}

/// Owns a spawned worker task. Aborts it if dropped without being joined.
struct WorkerHandle {
    ordinal: usize,
    task: Option<JoinHandle<Result<(), RingError>>>,
}

impl WorkerHandle {
    fn spawn<D: Decryptor + 'static>(
        worker: Worker,
        links: UnitLinks,
        tester: Arc<KeyTester<D>>,
    ) -> Self {
        let ordinal = worker.ordinal();
        let span = tracing::debug_span!("worker", ordinal);

        let task = tokio::spawn(
            async move { drive(worker, links, &tester).await.map(|_| ()) }.instrument(span),
        );

        Self { ordinal, task: Some(task) }
    }

    async fn join(mut self) -> Result<(), RingError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(ordinal = self.ordinal, error = %e, "worker did not finish");
                Err(RingError::UnitFailed { ordinal: self.ordinal })
            },
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Feed events to `unit` and execute its actions until it exits.
///
/// Returns the message the unit reported, if any. The unit's links are
/// dropped on return, which closes its downstream for the neighbour.
async fn drive<U, D>(
    mut unit: U,
    links: UnitLinks,
    tester: &Arc<KeyTester<D>>,
) -> Result<Option<Message>, RingError>
where
    U: RingUnit,
    D: Decryptor + 'static,
{
    let UnitLinks { ordinal, mut upstream, downstream } = links;
    let mut events = VecDeque::from([UnitEvent::Started]);
    let mut reported = None;

    while let Some(event) = events.pop_front() {
        for action in unit.handle(event)? {
            match action {
                UnitAction::Scan(partition) => {
                    tracing::debug!(
                        ordinal,
                        start = partition.start(),
                        end = partition.end(),
                        "scanning partition"
                    );

                    let tester = Arc::clone(tester);
                    let summary =
                        tokio::task::spawn_blocking(move || tester.scan(partition.offsets()))
                            .await
                            .map_err(|_| RingError::UnitFailed { ordinal })?;

                    tracing::debug!(ordinal, tried = summary.tried, "scan finished");
                    events.push_back(UnitEvent::ScanFinished { candidate: summary.candidate });
                },

                UnitAction::Send(message) => {
                    if let Err(e) = downstream.send(&message) {
                        tracing::warn!(ordinal, error = %e, "downstream write failed");
                    }
                },

                UnitAction::Receive => {
                    let event = match upstream.recv().await {
                        Ok(message) => UnitEvent::Received(message),
                        Err(LinkError::Closed { edge }) => {
                            tracing::debug!(ordinal, %edge, "upstream closed");
                            UnitEvent::UpstreamClosed
                        },
                        Err(e) => {
                            tracing::warn!(ordinal, error = %e, "discarding malformed record");
                            UnitEvent::UpstreamClosed
                        },
                    };
                    events.push_back(event);
                },

                UnitAction::Report(message) => reported = Some(message),

                UnitAction::Exit => return Ok(reported),
            }
        }
    }

    Ok(reported)
}

/// Turn the message that completed the cycle into the final report.
fn report<D: Decryptor>(
    tester: &KeyTester<D>,
    message: Message,
) -> Result<SearchReport, RingError> {
    let Message::Found { offset, key } = message else {
        tracing::info!("key not found");
        return Ok(SearchReport::NotFound);
    };

    let (confirmed, plaintext) = tester.confirm(offset)?;
    if confirmed != key {
        tracing::warn!(offset, "relayed key differs from re-derived key, reporting re-derived");
    }

    tracing::info!(offset, "key found");

    Ok(SearchReport::Found {
        offset,
        key: confirmed,
        plaintext: Plaintext::new(plaintext.as_ref().to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use ringsearch_crypto::{CryptoError, KEY_LENGTH, KeySpace, TrialKey};

    use super::*;
    use crate::link::{EdgeId, link};

    /// Decrypts to the key's last byte, so offset `n` "decrypts" to `[n]`.
    struct LastByte;

    impl Decryptor for LastByte {
        type Plaintext = Vec<u8>;

        fn decrypt(&self, key: &TrialKey, _ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
            Ok(vec![key.as_bytes()[KEY_LENGTH - 1]])
        }
    }

    fn tester(size: u64, target: u8) -> KeyTester<LastByte> {
        let space = KeySpace::from_parts([0; KEY_LENGTH], size).unwrap();
        KeyTester::new(space, LastByte, vec![0; 16], vec![target])
    }

    #[test]
    fn report_confirms_relayed_key() {
        let tester = tester(100, 80);
        let key = tester.key_space().candidate(80).unwrap();

        let report = report(&tester, Message::Found { offset: 80, key: key.clone() }).unwrap();

        assert_eq!(
            report,
            SearchReport::Found { offset: 80, key, plaintext: Plaintext::new(vec![80]) }
        );
    }

    #[test]
    fn report_prefers_re_derived_key() {
        let tester = tester(100, 80);
        let bogus = TrialKey::from_bytes([0xFF; KEY_LENGTH]);

        let SearchReport::Found { key, .. } =
            report(&tester, Message::Found { offset: 80, key: bogus }).unwrap()
        else {
            panic!("expected a found report");
        };

        assert_eq!(key, tester.key_space().candidate(80).unwrap());
    }

    #[test]
    fn report_rejects_offset_outside_space() {
        let tester = tester(100, 80);
        let key = TrialKey::from_bytes([0; KEY_LENGTH]);

        assert!(matches!(
            report(&tester, Message::Found { offset: 100, key }),
            Err(RingError::Confirm(_))
        ));
    }

    #[tokio::test]
    async fn single_worker_ring_finds_key() {
        let config = RingConfig::new(NonZeroUsize::new(1).unwrap());

        let report = Ring::new(config, tester(10, 7)).run().await.unwrap();

        assert_eq!(report.offset(), Some(7));
    }

    #[tokio::test]
    async fn over_limit_fails_before_spawning() {
        let mut config = RingConfig::new(NonZeroUsize::new(3).unwrap());
        config.max_workers = 2;

        let result = Ring::new(config, tester(10, 7)).run().await;

        assert!(matches!(result, Err(RingError::Topology(_))));
    }

    #[tokio::test]
    async fn dropped_handle_aborts_task() {
        let (mut tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = WorkerHandle {
            ordinal: 1,
            task: Some(tokio::spawn(async move {
                let _ = rx.await;
                Ok(())
            })),
        };

        drop(handle);

        // The aborted task drops its receiver
        tokio::time::timeout(std::time::Duration::from_secs(5), tx.closed()).await.unwrap();
    }

    #[tokio::test]
    async fn worker_continues_after_failed_downstream_write() {
        // 3 makes the worker a finder, 0xFF makes it a relay
        for target in [3, 0xFF] {
            let tester = Arc::new(tester(10, target));
            let (into_worker, upstream) = link(EdgeId(0));
            let (downstream, from_worker) = link(EdgeId(1));
            drop(from_worker);
            into_worker.send(&Message::NotFound).unwrap();

            let worker = Worker::new(1, Partition::new(0, 10));
            let links = UnitLinks { ordinal: 1, upstream, downstream };

            // The writer stays alive, so returning at all means the record was read
            let reported = tokio::time::timeout(
                std::time::Duration::from_secs(5),
                drive(worker, links, &tester),
            )
            .await
            .unwrap();

            assert!(matches!(reported, Ok(None)), "target {target}");
        }
    }

    #[tokio::test]
    async fn coordinator_fails_when_ring_closes_unsent() {
        let tester = Arc::new(tester(10, 3));
        let (downstream, _seed_reader) = link(EdgeId(0));
        let (last_writer, upstream) = link(EdgeId(1));
        drop(last_writer);

        let links = UnitLinks { ordinal: 0, upstream, downstream };
        let result = drive(Coordinator::new(), links, &tester).await;

        assert!(matches!(result, Err(RingError::Unit(UnitError::RingBroken))));
    }
}
