//! Subcommand implementations.

pub mod input;
pub mod max_price;
pub mod products;
pub mod watch;

use std::io::{self, Write};

use thiserror::Error;
use wb_dashboard::ApiError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Reading stdin or writing stdout failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Write one line of command output to stdout.
pub fn say(message: impl std::fmt::Display) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{message}")?;
    out.flush()
}
