//! Command-line error type.

use std::{io, path::PathBuf};

use ringsearch_core::RingError;
use ringsearch_crypto::KeyError;
use thiserror::Error;

/// Everything that stops the search before a report is written.
#[derive(Error, Debug)]
pub enum CliError {
    /// An input file could not be read
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The known plaintext file is empty and would match any key
    #[error("plaintext file {} is empty", path.display())]
    EmptyPlaintext {
        /// Offending file
        path: PathBuf,
    },

    /// The ciphertext is not a whole number of cipher blocks
    #[error("ciphertext in {} is {len} bytes, not a non-empty multiple of {block_size}", path.display())]
    CiphertextLength {
        /// Offending file
        path: PathBuf,
        /// Bytes read
        len: usize,
        /// Cipher block size
        block_size: usize,
    },

    /// The partial key does not describe a searchable key space
    #[error("invalid partial key: {0}")]
    PartialKey(#[from] KeyError),

    /// The search itself failed
    #[error(transparent)]
    Ring(#[from] RingError),

    /// The report could not be written
    #[error("failed to write report: {0}")]
    Output(io::Error),
}
