//! Client errors.

use std::io;

use lnchat_core::PeerIdError;
use thiserror::Error;

use crate::TerminalError;

/// Errors that end the client.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Destination given on the command line did not parse.
    #[error("invalid destination {input:?}: {reason}")]
    Destination {
        /// Argument as given.
        input: String,
        /// Why it did not parse.
        reason: PeerIdError,
    },

    /// Log file could not be opened.
    #[error("cannot open log file: {0}")]
    LogFile(#[source] io::Error),

    /// Terminal setup, input or rendering failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] TerminalError),
}
