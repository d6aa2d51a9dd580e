//! Candidate key testing
//!
//! [`KeyTester`] owns everything a worker needs to judge an offset: the key
//! space, the ciphertext, the known plaintext and the decrypt primitive. It
//! is shared read-only between workers.

use std::ops::Range;

use crate::{
    cipher::Decryptor,
    error::CryptoError,
    key_space::{KeySpace, TrialKey},
};

/// Result of testing one offset.
///
/// The decrypted buffer is owned by the caller and released when the outcome
/// goes out of scope.
#[derive(Debug)]
pub enum Outcome<P> {
    /// Decrypted bytes start with the known plaintext
    Match {
        /// Key that produced the match
        key: TrialKey,
        /// Decrypted bytes
        plaintext: P,
    },
    /// Not a match, or the decrypt primitive failed
    NoMatch,
}

impl<P> Outcome<P> {
    /// Returns true for [`Outcome::Match`].
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

/// A matching offset found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Offset within the key space
    pub offset: u64,
    /// Full key for that offset
    pub key: TrialKey,
}

/// What a scan over a range observed.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// First match in the range, if any
    pub candidate: Option<Candidate>,
    /// Offsets tested, including the match
    pub tried: u64,
    /// Offsets whose decryption failed
    pub decrypt_failures: u64,
}

/// Tests candidate keys against a known plaintext/ciphertext pair.
#[derive(Debug)]
pub struct KeyTester<D> {
    space: KeySpace,
    decryptor: D,
    ciphertext: Vec<u8>,
    plaintext: Vec<u8>,
}

impl<D: Decryptor> KeyTester<D> {
    /// Create a tester.
    ///
    /// An empty `plaintext` matches every candidate.
    pub fn new(space: KeySpace, decryptor: D, ciphertext: Vec<u8>, plaintext: Vec<u8>) -> Self {
        Self { space, decryptor, ciphertext, plaintext }
    }

    /// Key space being searched.
    pub fn key_space(&self) -> &KeySpace {
        &self.space
    }

    /// Test a single offset.
    ///
    /// A decrypt failure is logged and reported as [`Outcome::NoMatch`]; it
    /// never aborts the caller's scan.
    pub fn try_key(&self, offset: u64) -> Outcome<D::Plaintext> {
        self.judge(offset, &mut 0)
    }

    /// Test `offsets` in increasing order, stopping at the first match.
    ///
    /// Each iteration's decrypted buffer is dropped before the next offset is
    /// tried.
    pub fn scan(&self, offsets: Range<u64>) -> ScanSummary {
        let mut summary = ScanSummary::default();

        for offset in offsets {
            summary.tried += 1;

            if let Outcome::Match { key, .. } = self.judge(offset, &mut summary.decrypt_failures) {
                summary.candidate = Some(Candidate { offset, key });
                break;
            }
        }

        if summary.decrypt_failures > 0 {
            tracing::warn!(
                failures = summary.decrypt_failures,
                tried = summary.tried,
                "candidates failed to decrypt during scan"
            );
        }

        summary
    }

    /// Re-derive the key for `offset` and decrypt the full ciphertext.
    ///
    /// Used to recover the plaintext for display once a match is known.
    pub fn confirm(&self, offset: u64) -> Result<(TrialKey, D::Plaintext), CryptoError> {
        let key = self.space.candidate(offset)?;
        let plaintext = self.decryptor.decrypt(&key, &self.ciphertext)?;
        Ok((key, plaintext))
    }

    /// Test one offset, counting a decrypt failure into `failures` and
    /// treating it as no match.
    fn judge(&self, offset: u64, failures: &mut u64) -> Outcome<D::Plaintext> {
        match self.attempt(offset) {
            Ok(outcome) => outcome,
            Err(e) => {
                *failures += 1;
                tracing::debug!(offset, error = %e, "decrypt failed, treating as no match");
                Outcome::NoMatch
            },
        }
    }

    fn attempt(&self, offset: u64) -> Result<Outcome<D::Plaintext>, CryptoError> {
        let key = self.space.candidate(offset)?;
        let plaintext = self.decryptor.decrypt(&key, &self.ciphertext)?;

        if plaintext.as_ref().starts_with(&self.plaintext) {
            Ok(Outcome::Match { key, plaintext })
        } else {
            Ok(Outcome::NoMatch)
        }
    }
}
