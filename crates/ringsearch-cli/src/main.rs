//! Ringsearch binary.
//!
//! # Usage
//!
//! ```bash
//! # Search 256 candidates for the last key byte with 4 workers
//! ringsearch 4 B1AF2507B69F11CCB3AE2C35920391A cipher.bin plain.txt
//!
//! # Custom IV and verbose logging
//! RUST_LOG=debug ringsearch 8 B1AF2507B69F11CCB3AE2C3592039 cipher.bin plain.txt --iv fedcba9876543210
//! ```
//!
//! The report goes to stdout; diagnostics go to stderr.

use std::io::{self, Write};

use clap::Parser;
use ringsearch_cli::{Args, CliError, run};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let report = run(&args).await.inspect_err(|e| tracing::error!("{e}"))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{report}").map_err(CliError::Output)?;

    Ok(())
}
