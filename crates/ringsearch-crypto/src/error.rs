//! Error types for key space setup and candidate testing

use thiserror::Error;

/// Errors from building a key space or materializing a candidate key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Partial key is longer than a full key
    #[error("partial key too long: {actual} bytes, key is {max} bytes")]
    PartialKeyTooLong {
        /// Length of the supplied partial key
        actual: usize,
        /// Full key length
        max: usize,
    },

    /// Too many trailing bytes left unknown to search
    #[error("too many unknown key bytes: {unknown}, at most {max} can be searched")]
    TooManyUnknownBytes {
        /// Number of unknown trailing bytes
        unknown: usize,
        /// Maximum number of searchable bytes
        max: usize,
    },

    /// Requested key space does not fit the searchable low-order bytes
    #[error("key space of {size} exceeds maximum {max}")]
    KeySpaceTooLarge {
        /// Requested key space size
        size: u64,
        /// Maximum key space size
        max: u64,
    },

    /// Offset lies outside the key space
    #[error("offset {offset} outside key space of {size}")]
    OffsetOutOfRange {
        /// Requested offset
        offset: u64,
        /// Key space size
        size: u64,
    },
}

/// Errors from the decrypt primitive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Cipher could not be initialized with the given key and IV
    #[error("cipher initialization failed: {reason}")]
    Initialization {
        /// Reason reported by the cipher
        reason: String,
    },

    /// Ciphertext is empty or not a whole number of cipher blocks
    #[error("invalid ciphertext length {len}: must be a positive multiple of {block_size}")]
    InvalidCiphertextLength {
        /// Ciphertext length in bytes
        len: usize,
        /// Cipher block size in bytes
        block_size: usize,
    },

    /// Candidate key could not be materialized
    #[error(transparent)]
    Key(#[from] KeyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = KeyError::TooManyUnknownBytes { unknown: 9, max: 7 };
        assert_eq!(err.to_string(), "too many unknown key bytes: 9, at most 7 can be searched");

        let err = CryptoError::from(KeyError::OffsetOutOfRange { offset: 100, size: 100 });
        assert_eq!(err.to_string(), "offset 100 outside key space of 100");
    }
}
