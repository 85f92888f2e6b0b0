//! Inbound message consumer.
//!
//! One long-lived task per session reads the stream of messages other peers
//! send us. Each message is applied under the session lock: the sender
//! becomes the destination if none is set, the line is appended already
//! delivered, and the sender's ledger entry is credited.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use lnchat_core::{InboundFailure, InboundMessage};
use tokio::task::JoinHandle;

use crate::{
    InboundHealth, PaymentClient,
    session::{Session, wait_for_shutdown},
};

/// Applies inbound messages to a session.
#[derive(Clone, Debug)]
pub struct InboundCoordinator {
    session: Session,
}

impl InboundCoordinator {
    /// Create a coordinator for `session`.
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Subscribe through `client` and consume messages on a spawned task.
    ///
    /// A failed subscription is reported through the session's inbound
    /// health. Must be called from within a tokio runtime.
    pub fn start<P: PaymentClient>(self, client: Arc<P>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let shutdown = self.session.shutdown_signal();
            let subscription = tokio::select! {
                biased;
                () = wait_for_shutdown(shutdown) => return,
                subscription = client.subscribe_inbound() => subscription,
            };
            match subscription {
                Ok(stream) => self.run(stream).await,
                Err(e) => {
                    tracing::warn!(error = %e, "inbound subscription failed");
                    self.session
                        .set_inbound_health(InboundHealth::Failed(InboundFailure::Subscribe(
                            e.to_string(),
                        )));
                },
            }
        })
    }

    /// Consume `stream` until it ends, fails, or the session shuts down.
    pub async fn run<S, E>(&self, stream: S)
    where
        S: Stream<Item = Result<InboundMessage, E>>,
        E: std::fmt::Display,
    {
        let mut stream = std::pin::pin!(stream);
        let mut shutdown = std::pin::pin!(wait_for_shutdown(self.session.shutdown_signal()));
        self.session.set_inbound_health(InboundHealth::Listening);
        tracing::info!("listening for inbound messages");

        loop {
            let next = tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::debug!("inbound consumer stopped at shutdown");
                    return;
                },
                next = stream.next() => next,
            };

            match next {
                Some(Ok(message)) => self.apply(message),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "inbound stream failed");
                    self.session
                        .set_inbound_health(InboundHealth::Failed(InboundFailure::Stream(
                            e.to_string(),
                        )));
                    return;
                },
                None => {
                    tracing::info!("inbound stream closed");
                    self.session.set_inbound_health(InboundHealth::Closed);
                    return;
                },
            }
        }
    }

    fn apply(&self, message: InboundMessage) {
        let sender = message.sender.short();
        let amount = message.amount_received;
        let receipt = self.session.record_inbound(message);
        if receipt.bound_destination {
            tracing::info!(dest = %sender, "destination bound to first inbound sender");
        }
        tracing::debug!(
            line = receipt.line.get(),
            sender = %sender,
            amount,
            balance = receipt.balance,
            "inbound message"
        );
    }
}
