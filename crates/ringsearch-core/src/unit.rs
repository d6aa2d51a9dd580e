//! Ring unit state machines.
//!
//! Pure logic for the coordinator and the workers. Each unit takes
//! [`UnitEvent`]s and returns [`UnitAction`]s for the runtime to execute; no
//! I/O happens here, which keeps every protocol path testable without
//! spawning anything.
//!
//! # Coordinator
//!
//! ```text
//! ┌──────┐ Started  ┌─────────────┐ Received  ┌──────────┐
//! │ Seed │─────────>│ AwaitResult │──────────>│ Reported │
//! └──────┘ Send(NF) └─────────────┘ Report    └──────────┘
//!          Receive                  Exit
//! ```
//!
//! # Worker
//!
//! ```text
//! ┌──────┐ Started ┌──────────┐ ScanFinished(match)   ┌──────────┐ Received/Closed ┌──────┐
//! │ Idle │────────>│ Scanning │──────────────────────>│ Draining │────────────────>│ Done │
//! └──────┘ Scan    └──────────┘ Send(Found), Receive  └──────────┘ Exit            └──────┘
//!                       │                                                            ^
//!                       │ ScanFinished(none)   ┌──────────┐ Received: Send, Exit     │
//!                       └─────────────────────>│ Relaying │──────────────────────────┘
//!                         Receive              └──────────┘ Closed: Exit
//! ```
//!
//! A worker that finds a match writes it downstream at once and then performs
//! exactly one read of its upstream link, discarding the result. That read
//! consumes the one record its upstream neighbour will ever write, so no link
//! is left holding an unread record. A worker that exhausts its range reads
//! one record and forwards it unchanged.

use ringsearch_crypto::Candidate;

use crate::{error::UnitError, message::Message, partition::Partition, topology::COORDINATOR};

/// Inputs to a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitEvent {
    /// The unit has been spawned
    Started,

    /// The unit's scan finished
    ScanFinished {
        /// First match in the partition, if any
        candidate: Option<Candidate>,
    },

    /// A message arrived on the upstream link
    Received(Message),

    /// The upstream link closed without delivering a message
    UpstreamClosed,
}

impl UnitEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Started => "Started",
            Self::ScanFinished { .. } => "ScanFinished",
            Self::Received(_) => "Received",
            Self::UpstreamClosed => "UpstreamClosed",
        }
    }
}

/// Outputs of a unit, executed in order by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitAction {
    /// Scan the partition and deliver [`UnitEvent::ScanFinished`]
    Scan(Partition),

    /// Write this message downstream
    Send(Message),

    /// Read one message upstream and deliver [`UnitEvent::Received`] or
    /// [`UnitEvent::UpstreamClosed`]
    Receive,

    /// Final result of the search (coordinator only)
    Report(Message),

    /// Stop processing and release the unit's links
    Exit,
}

/// Common interface the runtime drives.
pub trait RingUnit {
    /// Position on the ring (0 = coordinator).
    fn ordinal(&self) -> usize;

    /// Process one event.
    fn handle(&mut self, event: UnitEvent) -> Result<Vec<UnitAction>, UnitError>;
}

/// Coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Not started; the seed has not been sent
    Seed,
    /// Seed sent, waiting for the message to come back around
    AwaitResult,
    /// Result reported
    Reported,
}

impl CoordinatorState {
    fn name(self) -> &'static str {
        match self {
            Self::Seed => "Seed",
            Self::AwaitResult => "AwaitResult",
            Self::Reported => "Reported",
        }
    }
}

/// Coordinator state machine.
///
/// Seeds the ring with [`Message::NotFound`], waits for exactly one message
/// to complete the cycle, and reports it.
#[derive(Debug, Clone)]
pub struct Coordinator {
    state: CoordinatorState,
}

impl Coordinator {
    /// Create a coordinator in [`CoordinatorState::Seed`].
    pub fn new() -> Self {
        Self { state: CoordinatorState::Seed }
    }

    /// Current state.
    pub fn state(&self) -> CoordinatorState {
        self.state
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RingUnit for Coordinator {
    fn ordinal(&self) -> usize {
        COORDINATOR
    }

    fn handle(&mut self, event: UnitEvent) -> Result<Vec<UnitAction>, UnitError> {
        match (self.state, event) {
            (CoordinatorState::Seed, UnitEvent::Started) => {
                self.state = CoordinatorState::AwaitResult;
                Ok(vec![UnitAction::Send(Message::NotFound), UnitAction::Receive])
            },
            (CoordinatorState::AwaitResult, UnitEvent::Received(message)) => {
                self.state = CoordinatorState::Reported;
                Ok(vec![UnitAction::Report(message), UnitAction::Exit])
            },
            (CoordinatorState::AwaitResult, UnitEvent::UpstreamClosed) => Err(UnitError::RingBroken),
            (state, event) => Err(UnitError::UnexpectedEvent {
                ordinal: COORDINATOR,
                state: state.name(),
                event: event.name(),
            }),
        }
    }
}

/// Worker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Not started
    Idle,
    /// Scanning its partition
    Scanning,
    /// Found a match and sent it; waiting to consume one upstream message
    Draining,
    /// Exhausted its partition; waiting for a message to forward
    Relaying,
    /// Terminal action taken
    Done,
}

impl WorkerState {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Scanning => "Scanning",
            Self::Draining => "Draining",
            Self::Relaying => "Relaying",
            Self::Done => "Done",
        }
    }
}

/// Worker state machine.
#[derive(Debug, Clone)]
pub struct Worker {
    ordinal: usize,
    partition: Partition,
    state: WorkerState,
}

impl Worker {
    /// Create worker `ordinal` responsible for `partition`.
    pub fn new(ordinal: usize, partition: Partition) -> Self {
        debug_assert!(ordinal != COORDINATOR, "workers are numbered from 1");
        Self { ordinal, partition, state: WorkerState::Idle }
    }

    /// Current state.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Assigned partition.
    pub fn partition(&self) -> Partition {
        self.partition
    }
}

impl RingUnit for Worker {
    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn handle(&mut self, event: UnitEvent) -> Result<Vec<UnitAction>, UnitError> {
        match (self.state, event) {
            (WorkerState::Idle, UnitEvent::Started) => {
                self.state = WorkerState::Scanning;
                Ok(vec![UnitAction::Scan(self.partition)])
            },

            (WorkerState::Scanning, UnitEvent::ScanFinished { candidate: Some(found) }) => {
                tracing::info!(ordinal = self.ordinal, offset = found.offset, "key found");
                self.state = WorkerState::Draining;
                let message = Message::Found { offset: found.offset, key: found.key };
                Ok(vec![UnitAction::Send(message), UnitAction::Receive])
            },

            (WorkerState::Scanning, UnitEvent::ScanFinished { candidate: None }) => {
                self.state = WorkerState::Relaying;
                Ok(vec![UnitAction::Receive])
            },

            (WorkerState::Draining, UnitEvent::Received(_) | UnitEvent::UpstreamClosed) => {
                self.state = WorkerState::Done;
                Ok(vec![UnitAction::Exit])
            },

            (WorkerState::Relaying, UnitEvent::Received(message)) => {
                tracing::debug!(ordinal = self.ordinal, key_number = message.key_number(), "relaying");
                self.state = WorkerState::Done;
                Ok(vec![UnitAction::Send(message), UnitAction::Exit])
            },

            (WorkerState::Relaying, UnitEvent::UpstreamClosed) => {
                tracing::warn!(ordinal = self.ordinal, "upstream closed with nothing to relay");
                self.state = WorkerState::Done;
                Ok(vec![UnitAction::Exit])
            },

            (state, event) => Err(UnitError::UnexpectedEvent {
                ordinal: self.ordinal,
                state: state.name(),
                event: event.name(),
            }),
        }
    }
}
