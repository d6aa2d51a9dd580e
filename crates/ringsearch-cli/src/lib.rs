//! Ringsearch command-line driver.
//!
//! Argument parsing, input loading and the glue that runs one search. The
//! binary in `main.rs` only sets up logging and prints the report.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;

use std::{
    fmt, fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use clap::Parser;
pub use error::CliError;
use ringsearch_core::{Ring, RingConfig, SearchReport};
use ringsearch_crypto::{Aes256CbcDecryptor, BLOCK_SIZE, KeySpace, KeyTester};

/// Recover the missing suffix of an AES-256 key by searching a ring of workers
#[derive(Parser, Debug)]
#[command(name = "ringsearch")]
#[command(about = "Distributed brute-force search for a partially known AES-256 key")]
#[command(version)]
pub struct Args {
    /// Number of worker units on the ring
    pub workers: NonZeroUsize,

    /// Known leading characters of the key (25 to 32 of them)
    pub partial_key: String,

    /// File holding the AES-256-CBC ciphertext
    pub cipher_file: PathBuf,

    /// File holding the known plaintext prefix
    pub plain_file: PathBuf,

    /// Initialization vector, exactly 16 characters
    #[arg(long, default_value = "0123456789012345", value_parser = parse_iv)]
    pub iv: [u8; BLOCK_SIZE],

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

fn parse_iv(raw: &str) -> Result<[u8; BLOCK_SIZE], String> {
    <[u8; BLOCK_SIZE]>::try_from(raw.as_bytes())
        .map_err(|_| format!("IV must be exactly {BLOCK_SIZE} bytes, got {}", raw.len()))
}

/// Contents of the two input files.
#[derive(Debug)]
pub struct Inputs {
    /// Ciphertext to break
    pub ciphertext: Vec<u8>,
    /// Known plaintext prefix
    pub plaintext: Vec<u8>,
}

impl Inputs {
    /// Read and validate both input files.
    pub fn load(args: &Args) -> Result<Self, CliError> {
        let ciphertext = read(&args.cipher_file)?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CliError::CiphertextLength {
                path: args.cipher_file.clone(),
                len: ciphertext.len(),
                block_size: BLOCK_SIZE,
            });
        }

        let plaintext = read(&args.plain_file)?;
        if plaintext.is_empty() {
            return Err(CliError::EmptyPlaintext { path: args.plain_file.clone() });
        }

        Ok(Self { ciphertext, plaintext })
    }

    /// Known plaintext with non-printable bytes escaped, for logging.
    pub fn plaintext_escaped(&self) -> impl fmt::Display {
        self.plaintext.escape_ascii()
    }
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })
}

/// Load the inputs described by `args` and run one search.
pub async fn run(args: &Args) -> Result<SearchReport, CliError> {
    let inputs = Inputs::load(args)?;
    let space = KeySpace::from_partial_key(&args.partial_key)?;

    tracing::info!(plaintext = %inputs.plaintext_escaped(), "known plaintext");
    tracing::info!(
        plaintext_len = inputs.plaintext.len(),
        ciphertext_len = inputs.ciphertext.len(),
        key_space = space.size(),
        workers = args.workers.get(),
        "inputs loaded"
    );

    let decryptor = Aes256CbcDecryptor::new(args.iv);
    let tester = KeyTester::new(space, decryptor, inputs.ciphertext, inputs.plaintext);

    Ok(Ring::new(RingConfig::new(args.workers), tester).run().await?)
}
