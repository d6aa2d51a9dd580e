//! Error types for the ring protocol.
//!
//! Strongly-typed errors per layer: wire records, links, topology
//! construction, unit state machines and the runtime that ties them together.
//! Link and per-record failures are absorbed by the runtime and logged;
//! construction and state machine failures propagate to the caller.

use ringsearch_crypto::CryptoError;
use thiserror::Error;

use crate::link::EdgeId;

/// Errors decoding or encoding a wire record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer is not exactly one record
    #[error("record size mismatch: expected {expected} bytes, got {actual}")]
    RecordSize {
        /// Record size
        expected: usize,
        /// Buffer size
        actual: usize,
    },

    /// `key_number` is neither the sentinel nor a valid offset
    #[error("invalid key number {0}")]
    InvalidKeyNumber(i64),

    /// Offset does not fit the signed `key_number` field
    #[error("offset {0} does not fit a key number")]
    OffsetTooLarge(u64),
}

/// Errors moving a record across a link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The other end of the link is gone
    #[error("{edge} closed")]
    Closed {
        /// Link that closed
        edge: EdgeId,
    },

    /// A record is already waiting on the link
    #[error("{edge} already holds an unread record")]
    Full {
        /// Link that was full
        edge: EdgeId,
    },

    /// Record could not be encoded or decoded
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Errors building the ring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Requested more workers than the configured limit
    #[error("{requested} workers requested, limit is {max}")]
    TooManyWorkers {
        /// Requested worker count
        requested: usize,
        /// Configured limit
        max: usize,
    },
}

/// Errors from a unit state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// Event arrived in a state that cannot handle it
    #[error("unit {ordinal}: unexpected {event} in state {state}")]
    UnexpectedEvent {
        /// Unit ordinal (0 = coordinator)
        ordinal: usize,
        /// State when the event arrived
        state: &'static str,
        /// Event that was delivered
        event: &'static str,
    },

    /// The ring closed before a result reached the coordinator
    #[error("ring closed before a result reached the coordinator")]
    RingBroken,
}

/// Errors running a search around the ring.
#[derive(Error, Debug)]
pub enum RingError {
    /// Ring could not be built
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    /// A unit state machine failed
    #[error("unit error: {0}")]
    Unit(#[from] UnitError),

    /// A worker panicked or was cancelled before finishing
    #[error("worker {ordinal} did not finish")]
    UnitFailed {
        /// Ordinal of the failed worker
        ordinal: usize,
    },

    /// Reported key could not be re-checked
    #[error("could not confirm reported key: {0}")]
    Confirm(#[from] CryptoError),
}
