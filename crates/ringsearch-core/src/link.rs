//! Directional links between neighbouring units.
//!
//! A link is a single-slot channel carrying encoded [`Message`] records. The
//! protocol writes each link exactly once, so one slot is enough for
//! [`Downstream::send`] to never suspend. Each end is owned by exactly one
//! unit; dropping the [`Downstream`] end is observed by the reader as
//! [`LinkError::Closed`].

use std::fmt;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::{
    error::LinkError,
    message::{Message, Record},
};

/// Records a link can hold before a write would block.
pub const LINK_CAPACITY: usize = 1;

/// Position of a link in the ring.
///
/// Edge `i` runs from unit `i` to unit `(i + 1) mod (N + 1)`, unit 0 being the
/// coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge {}", self.0)
    }
}

/// Write end of a link.
#[derive(Debug)]
pub struct Downstream {
    edge: EdgeId,
    tx: mpsc::Sender<Record>,
}

/// Read end of a link.
#[derive(Debug)]
pub struct Upstream {
    edge: EdgeId,
    rx: mpsc::Receiver<Record>,
}

/// Create a link.
pub fn link(edge: EdgeId) -> (Downstream, Upstream) {
    let (tx, rx) = mpsc::channel(LINK_CAPACITY);
    (Downstream { edge, tx }, Upstream { edge, rx })
}

impl Downstream {
    /// Link this end writes to.
    pub fn edge(&self) -> EdgeId {
        self.edge
    }

    /// Encode and write `message` without waiting.
    ///
    /// # Errors
    ///
    /// - `LinkError::Closed` if the reader is gone
    /// - `LinkError::Full` if an earlier record is still unread
    /// - `LinkError::Protocol` if the message cannot be encoded
    pub fn send(&self, message: &Message) -> Result<(), LinkError> {
        let record = message.encode()?;

        self.tx.try_send(record).map_err(|e| match e {
            TrySendError::Full(_) => LinkError::Full { edge: self.edge },
            TrySendError::Closed(_) => LinkError::Closed { edge: self.edge },
        })
    }
}

impl Upstream {
    /// Link this end reads from.
    pub fn edge(&self) -> EdgeId {
        self.edge
    }

    /// Wait for the next record and decode it.
    ///
    /// # Errors
    ///
    /// - `LinkError::Closed` if the writer dropped without sending
    /// - `LinkError::Protocol` if the record is malformed
    pub async fn recv(&mut self) -> Result<Message, LinkError> {
        let record = self.rx.recv().await.ok_or(LinkError::Closed { edge: self.edge })?;
        Ok(Message::decode(&record)?)
    }
}
