//! Payment client trait for abstracting the payment network.
//!
//! The [`PaymentClient`] trait decouples session coordination from the
//! concrete network client. The production front-end plugs in a real client
//! (or the in-process loopback network), tests plug in a scripted one, and
//! the coordinators run unchanged against either.

use std::future::Future;

use futures::stream::BoxStream;
use lnchat_core::{InboundMessage, PaymentRequest, PaymentStatus};

/// Status updates for one outbound payment.
pub type StatusStream<E> = BoxStream<'static, Result<PaymentStatus, E>>;

/// Messages received from peers.
pub type InboundStream<E> = BoxStream<'static, Result<InboundMessage, E>>;

/// Abstracts the payment network.
///
/// # Implementations
///
/// - **Loopback**: in-process network that settles every payment and echoes
///   replies, used by the terminal front-end
/// - **Scripted**: deterministic per-request status scripts for tests
pub trait PaymentClient: Send + Sync + 'static {
    /// Client-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a payment carrying a chat message.
    ///
    /// Returns the stream of status updates for that payment. The stream
    /// ends after a terminal status, or earlier if tracking fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment cannot be created at all.
    fn send_payment(
        &self,
        request: PaymentRequest,
    ) -> impl Future<Output = Result<StatusStream<Self::Error>, Self::Error>> + Send;

    /// Subscribe to chat messages sent to us.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be opened.
    fn subscribe_inbound(
        &self,
    ) -> impl Future<Output = Result<InboundStream<Self::Error>, Self::Error>> + Send;
}
