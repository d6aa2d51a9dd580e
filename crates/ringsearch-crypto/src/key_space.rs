//! Key space setup and trial key materialization
//!
//! A key is `KEY_LENGTH` bytes. The caller knows a prefix of it; the trailing
//! bytes are unknown and enumerated as a numeric offset. The last eight bytes
//! of the template are packed big-endian into `low_bits`, and a candidate key
//! is the template with those eight bytes replaced by `low_bits | offset`.
//!
//! ```text
//! byte:    0 ........................ 23 | 24 .................. 31
//!          known high-order template      | low_bits | offset (BE)
//! ```

use std::fmt;

use zeroize::Zeroize;

use crate::error::KeyError;

/// Length of a full key in bytes (AES-256)
pub const KEY_LENGTH: usize = 32;

/// Length of the trial key template in bytes
pub const TRIAL_LENGTH: usize = 32;

/// Maximum number of unknown trailing bytes that can be searched.
///
/// Offsets travel the ring as a signed 64-bit `key_number`, and the offset is
/// merged into the last eight template bytes, so seven bytes is the ceiling.
pub const MAX_UNKNOWN_BYTES: usize = 7;

/// Largest representable key space (`2^(8 * MAX_UNKNOWN_BYTES)`)
pub const MAX_KEY_SPACE: u64 = 1 << (8 * MAX_UNKNOWN_BYTES);

/// First template byte covered by `low_bits`
const LOW_BITS_START: usize = TRIAL_LENGTH - 8;

/// A full candidate key.
///
/// Key material is zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct TrialKey {
    bytes: [u8; KEY_LENGTH],
}

impl TrialKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }
}

impl fmt::Debug for TrialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TrialKey(")?;
        for byte in &self.bytes {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}

impl Drop for TrialKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// The set of candidate keys left to search.
///
/// Computed once at startup and never modified.
#[derive(Debug, Clone)]
pub struct KeySpace {
    /// Known high-order bytes, unknown bytes zeroed
    template: TrialKey,
    /// Last eight template bytes, big-endian
    low_bits: u64,
    /// Number of candidate offsets, `[0, size)`
    size: u64,
}

impl KeySpace {
    /// Build the key space for a textual partial key.
    ///
    /// Each character of `partial` is one key byte. The remaining
    /// `KEY_LENGTH - partial.len()` bytes are unknown and every value they can
    /// take is part of the space.
    ///
    /// # Errors
    ///
    /// - `KeyError::PartialKeyTooLong` if the partial key exceeds `KEY_LENGTH`
    /// - `KeyError::TooManyUnknownBytes` if more than `MAX_UNKNOWN_BYTES` are
    ///   missing
    pub fn from_partial_key(partial: &str) -> Result<Self, KeyError> {
        let known = partial.as_bytes();
        if known.len() > KEY_LENGTH {
            return Err(KeyError::PartialKeyTooLong { actual: known.len(), max: KEY_LENGTH });
        }

        let unknown = KEY_LENGTH - known.len();
        if unknown > MAX_UNKNOWN_BYTES {
            return Err(KeyError::TooManyUnknownBytes { unknown, max: MAX_UNKNOWN_BYTES });
        }

        let mut template = [0u8; TRIAL_LENGTH];
        template[..known.len()].copy_from_slice(known);
        let space = Self::from_parts(template, 1u64 << (8 * unknown));
        template.zeroize();
        space
    }

    /// Build a key space of arbitrary size over an explicit template.
    ///
    /// Template bits that an offset below `size` can reach are cleared, so
    /// every offset yields a distinct key and `template()` is the key for
    /// offset 0.
    ///
    /// # Errors
    ///
    /// - `KeyError::KeySpaceTooLarge` if `size` exceeds `MAX_KEY_SPACE`
    pub fn from_parts(mut template: [u8; TRIAL_LENGTH], size: u64) -> Result<Self, KeyError> {
        if size > MAX_KEY_SPACE {
            return Err(KeyError::KeySpaceTooLarge { size, max: MAX_KEY_SPACE });
        }

        let mut low = [0u8; 8];
        low.copy_from_slice(&template[LOW_BITS_START..]);

        let reachable = if size <= 1 { 0 } else { u64::MAX >> (size - 1).leading_zeros() };
        let low_bits = u64::from_be_bytes(low) & !reachable;
        template[LOW_BITS_START..].copy_from_slice(&low_bits.to_be_bytes());
        low.zeroize();

        Ok(Self { template: TrialKey::from_bytes(template), low_bits, size })
    }

    /// Number of candidate offsets.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Known key bytes with the unknown suffix zeroed.
    pub fn template(&self) -> &TrialKey {
        &self.template
    }

    /// Fixed low-order bits every candidate is merged with.
    pub fn low_bits(&self) -> u64 {
        self.low_bits
    }

    /// Materialize the key for `offset`.
    ///
    /// # Errors
    ///
    /// - `KeyError::OffsetOutOfRange` if `offset >= size()`
    pub fn candidate(&self, offset: u64) -> Result<TrialKey, KeyError> {
        if offset >= self.size {
            return Err(KeyError::OffsetOutOfRange { offset, size: self.size });
        }

        let mut bytes = *self.template.as_bytes();
        bytes[LOW_BITS_START..].copy_from_slice(&(self.low_bits | offset).to_be_bytes());
        Ok(TrialKey::from_bytes(bytes))
    }
}
