//! Core data model for lnchat
//!
//! Pure, synchronous types describing a chat conversation that rides on a
//! payment network: who we talk to ([`PeerId`]), what was said
//! ([`ConversationLog`]), how much value each peer has sent us ([`Ledger`]),
//! and the request/status vocabulary exchanged with the payment client
//! ([`PaymentRequest`], [`PaymentStatus`], [`InboundMessage`]).
//!
//! Nothing in this crate performs I/O or spawns tasks. Synchronization and
//! orchestration live in `lnchat-app`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod conversation;
pub mod error;
pub mod ledger;
pub mod payment;
pub mod peer;

pub use conversation::{ChatLine, ConversationLog, Delivery, LineIndex, Sender};
pub use error::{InboundFailure, LogError, PeerIdError, SendFailure};
pub use ledger::Ledger;
pub use payment::{FailureReason, InboundMessage, PaymentHash, PaymentRequest, PaymentStatus};
pub use peer::PeerId;
