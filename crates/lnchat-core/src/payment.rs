//! Vocabulary shared with the payment-network client.
//!
//! A chat message travels as metadata on a payment. The client accepts a
//! [`PaymentRequest`] and reports progress as a sequence of
//! [`PaymentStatus`] updates. Messages from peers arrive as
//! [`InboundMessage`]s once their payment has settled on our side.

use std::time::Duration;

use thiserror::Error;

use crate::PeerId;

/// Random correlation hash attached to each payment.
pub type PaymentHash = [u8; 32];

/// Request to send one chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Chat text carried as payment metadata.
    pub text: String,
    /// Amount to transfer in minor units.
    pub amount: u64,
    /// Receiving peer.
    pub destination: PeerId,
    /// Maximum routing fee in minor units.
    pub fee_limit: u64,
    /// Give up on routing after this long.
    pub timeout: Duration,
    /// Correlation hash for this payment.
    pub payment_hash: PaymentHash,
    /// CLTV delta required at the final hop.
    pub final_cltv_delta: u32,
}

/// Why the network gave up on a payment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Routing did not complete within the timeout.
    #[error("timeout")]
    Timeout,
    /// No route to the destination within the fee limit.
    #[error("no route")]
    NoRoute,
    /// Local channels lack the outbound capacity.
    #[error("insufficient balance")]
    InsufficientBalance,
    /// Any other network-reported error.
    #[error("{0}")]
    Other(String),
}

/// Progress update for an outbound payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Still being routed.
    InFlight,
    /// Settled. The recipient got the message.
    Succeeded {
        /// Routing fee paid in minor units.
        fee: u64,
    },
    /// The recipient rejected the payment details. The message itself still
    /// reached them.
    FailedDetailMismatch,
    /// Any other terminal failure.
    Failed {
        /// Network-reported reason.
        reason: FailureReason,
    },
}

/// A chat message received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Peer that sent the payment.
    pub sender: PeerId,
    /// Chat text carried by the payment.
    pub text: String,
    /// Value received in minor units.
    pub amount_received: u64,
}
