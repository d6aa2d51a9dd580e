//! Ringsearch Core
//!
//! Distributes a key-space search over a ring of workers and carries the
//! result back to a coordinator.
//!
//! # Ring
//!
//! ```text
//!   ┌─────────────┐ edge 0 ┌──────────┐ edge 1      edge N-1 ┌──────────┐
//!   │ Coordinator │───────>│ Worker 1 │──────> ··· ─────────>│ Worker N │
//!   └─────────────┘        └──────────┘                      └──────────┘
//!          ^                                                      │
//!          └────────────────────────── edge N ────────────────────┘
//! ```
//!
//! The coordinator seeds the ring with a "not found" message. Every worker
//! scans its own partition concurrently. A worker that finds a match writes it
//! downstream immediately, then drains one message from upstream; a worker
//! that finds nothing relays whatever arrives from upstream. Exactly one
//! message completes the cycle and the coordinator reports it.
//!
//! # Layout
//!
//! - [`unit`]: Sans-IO coordinator and worker state machines
//! - [`ring`]: the tokio runtime that executes their actions
//! - [`topology`] and [`link`]: ring wiring
//! - [`message`]: the fixed-size wire record
//! - [`partition`]: key space division

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod link;
pub mod message;
pub mod partition;
pub mod report;
pub mod ring;
pub mod topology;
pub mod unit;

pub use config::{DEFAULT_MAX_WORKERS, RingConfig};
pub use error::{LinkError, ProtocolError, RingError, TopologyError, UnitError};
pub use link::{Downstream, EdgeId, LINK_CAPACITY, Upstream, link};
pub use message::{Message, NOT_FOUND_SENTINEL, RECORD_SIZE, Record};
pub use partition::Partition;
pub use report::SearchReport;
pub use ring::Ring;
pub use topology::{COORDINATOR, Topology, UnitLinks};
pub use unit::{
    Coordinator, CoordinatorState, RingUnit, UnitAction, UnitEvent, Worker, WorkerState,
};
