//! Error types for the lnchat core.
//!
//! Each failure class gets its own enum so callers can tell a malformed peer
//! identifier apart from a payment that never settled or an inbound
//! subscription that went away. All of them are recoverable at the layer that
//! observes them; none is meant to terminate the process.

use thiserror::Error;

/// Errors produced when parsing or constructing a [`crate::PeerId`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeerIdError {
    /// Input is not valid hexadecimal.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Decoded identifier has the wrong number of bytes.
    #[error("expected {expected} bytes, got {actual}")]
    Length {
        /// Configured identifier length.
        expected: usize,
        /// Length of the decoded input.
        actual: usize,
    },
}

/// Why an outbound message ended in the failed state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// The payment client refused to create the payment.
    #[error("payment could not be issued: {0}")]
    Issue(String),

    /// The status stream reported an error before a terminal status.
    #[error("settlement stream failed: {0}")]
    SettlementStream(String),

    /// The status stream closed without a terminal status.
    #[error("settlement stream ended without a terminal status")]
    StreamEnded,

    /// The session shut down while the payment was still in flight.
    #[error("send abandoned at shutdown")]
    Abandoned,
}

/// Why the inbound message subscription stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InboundFailure {
    /// Subscribing to inbound messages failed.
    #[error("inbound subscription failed: {0}")]
    Subscribe(String),

    /// The inbound stream reported an error.
    #[error("inbound stream failed: {0}")]
    Stream(String),
}

/// Rejected mutations of the [`crate::ConversationLog`].
///
/// These guard the single-resolution rule for outbound lines: a line goes
/// from pending to exactly one terminal state and never changes again.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogError {
    /// No line exists at this index.
    #[error("no line at index {0}")]
    UnknownLine(usize),

    /// The line was received from a peer and cannot be resolved.
    #[error("line {0} is not an outbound line")]
    NotOutbound(usize),

    /// The line already reached a terminal state.
    #[error("line {0} is already resolved")]
    AlreadyResolved(usize),
}
