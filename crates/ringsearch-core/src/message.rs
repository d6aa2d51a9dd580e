//! Ring message and its fixed-size wire record.
//!
//! In memory a message is a tagged variant: either nothing has been found
//! yet, or a matching offset and its key. On a link it travels as a 40-byte
//! record (Big Endian):
//!
//! ```text
//! bytes 0-7   key_number  i64, -1 = not found, otherwise the offset
//! bytes 8-39  key         KEY_LENGTH raw key bytes (zero when not found)
//! ```
//!
//! The record has no version or magic: every unit runs from the same build
//! inside one process.

use ringsearch_crypto::{KEY_LENGTH, TrialKey};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::ProtocolError;

/// Reserved `key_number` meaning "no match found yet".
pub const NOT_FOUND_SENTINEL: i64 = -1;

/// Size of an encoded message in bytes.
pub const RECORD_SIZE: usize = 8 + KEY_LENGTH;

/// An encoded message.
pub type Record = [u8; RECORD_SIZE];

/// The single message that travels once around the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// No unit has found a match (yet)
    NotFound,

    /// A worker found a matching key
    Found {
        /// Offset within the key space
        offset: u64,
        /// Full key for that offset
        key: TrialKey,
    },
}

/// Raw record layout.
#[repr(C)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct WireRecord {
    key_number: [u8; 8],
    key: [u8; KEY_LENGTH],
}

impl Message {
    /// Numeric `key_number` as carried on the wire.
    ///
    /// Offsets beyond `i64::MAX` cannot be represented and saturate.
    pub fn key_number(&self) -> i64 {
        match self {
            Self::NotFound => NOT_FOUND_SENTINEL,
            Self::Found { offset, .. } => i64::try_from(*offset).unwrap_or(i64::MAX),
        }
    }

    /// Returns true for [`Message::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Serialize to a fixed-size record.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::OffsetTooLarge` if the offset does not fit a signed
    ///   64-bit `key_number`
    pub fn encode(&self) -> Result<Record, ProtocolError> {
        let record = match self {
            Self::NotFound => WireRecord {
                key_number: NOT_FOUND_SENTINEL.to_be_bytes(),
                key: [0u8; KEY_LENGTH],
            },
            Self::Found { offset, key } => {
                let key_number =
                    i64::try_from(*offset).map_err(|_| ProtocolError::OffsetTooLarge(*offset))?;
                WireRecord { key_number: key_number.to_be_bytes(), key: *key.as_bytes() }
            },
        };

        let mut bytes = [0u8; RECORD_SIZE];
        bytes.copy_from_slice(record.as_bytes());
        Ok(bytes)
    }

    /// Parse a record.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::RecordSize` if `bytes` is not exactly one record
    /// - `ProtocolError::InvalidKeyNumber` if `key_number` is below the
    ///   sentinel
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let record = WireRecord::ref_from_bytes(bytes)
            .map_err(|_| ProtocolError::RecordSize { expected: RECORD_SIZE, actual: bytes.len() })?;

        match i64::from_be_bytes(record.key_number) {
            NOT_FOUND_SENTINEL => Ok(Self::NotFound),
            n if n >= 0 => Ok(Self::Found { offset: n as u64, key: TrialKey::from_bytes(record.key) }),
            n => Err(ProtocolError::InvalidKeyNumber(n)),
        }
    }
}
