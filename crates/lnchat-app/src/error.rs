//! Session-level errors.

use lnchat_core::PeerIdError;
use thiserror::Error;

/// Errors raised while handling user input.
///
/// `InvalidDestination` and `NoDestinationSet` are recovered locally: the
/// line is dropped and reported back as
/// [`Submission::Dropped`](crate::Submission::Dropped) without touching
/// session state. Only `Closed` is returned as an `Err`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Destination-switch command with a malformed peer identifier.
    #[error("invalid destination {input:?}: {reason}")]
    InvalidDestination {
        /// Text after the command prefix.
        input: String,
        /// Why it did not parse.
        reason: PeerIdError,
    },

    /// Chat text typed before any destination was chosen.
    #[error("no destination set")]
    NoDestinationSet,

    /// The session has shut down and accepts no more input.
    #[error("session closed")]
    Closed,
}
