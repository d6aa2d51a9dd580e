//! Final search result.

use std::fmt;

use ringsearch_crypto::{Plaintext, TrialKey, strip_pkcs7};

/// What the coordinator reports once the ring has closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchReport {
    /// A worker found a key whose decryption starts with the known plaintext
    Found {
        /// Offset of the key within the key space
        offset: u64,
        /// Full key, re-derived from `offset`
        key: TrialKey,
        /// Complete decryption of the ciphertext under `key`
        plaintext: Plaintext,
    },

    /// No key in the space matched
    NotFound,
}

impl SearchReport {
    /// Returns true if a key was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Offset of the found key.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Found { offset, .. } => Some(*offset),
            Self::NotFound => None,
        }
    }
}

impl fmt::Display for SearchReport {
    /// Two lines on success, one on failure. Non-printable bytes are escaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { offset, key, plaintext } => {
                let text = strip_pkcs7(plaintext.as_bytes());
                writeln!(f, "OK: enc/dec ok for \"{}\"", text.escape_ascii())?;
                write!(f, "Key No.:{offset}:{}", key.as_bytes().escape_ascii())
            },
            Self::NotFound => write!(f, "Key not found"),
        }
    }
}
