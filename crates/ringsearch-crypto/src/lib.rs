//! Ringsearch Cryptographic Primitives
//!
//! Key space setup and candidate key testing for the ring search. Everything
//! here is synchronous and free of I/O; workers call into it from their own
//! threads.
//!
//! # Candidate Lifecycle
//!
//! ```text
//! Partial key ──► KeySpace (template, low_bits, size)
//!                    │
//!                    ▼ offset
//!                 TrialKey = template[..24] ‖ (low_bits | offset)
//!                    │
//!                    ▼ Decryptor
//!                 Plaintext ──► prefix compare ──► Outcome
//! ```
//!
//! Each decrypted buffer is owned by the [`Outcome`] that carries it and is
//! released when the outcome is dropped, once per tested offset. Key material
//! and decrypted bytes are zeroized on drop.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod error;
pub mod key_space;
pub mod tester;

pub use cipher::{
    Aes256CbcDecryptor, BLOCK_SIZE, DEFAULT_IV, Decryptor, Plaintext, strip_pkcs7,
};
pub use error::{CryptoError, KeyError};
pub use key_space::{
    KEY_LENGTH, KeySpace, MAX_KEY_SPACE, MAX_UNKNOWN_BYTES, TRIAL_LENGTH, TrialKey,
};
pub use tester::{Candidate, KeyTester, Outcome, ScanSummary};
