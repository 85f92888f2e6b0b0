//! In-process loopback payment network.
//!
//! Stands in for a real node so the client can run standalone. Every payment
//! settles after a fixed latency with a random routing fee, and the
//! destination answers each delivered message with a reply that carries the
//! same amount back.

use std::{
    future::Future,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use futures::{StreamExt, stream};
use lnchat_app::{InboundStream, PaymentClient, StatusStream};
use lnchat_core::{FailureReason, InboundMessage, PaymentRequest, PaymentStatus};
use rand::Rng;
use thiserror::Error;
use tokio::sync::mpsc;

/// Loopback network errors.
#[derive(Debug, Error)]
pub enum LoopbackError {
    /// The inbound feed supports a single subscriber.
    #[error("inbound feed already subscribed")]
    AlreadySubscribed,
}

/// Payment network that lives inside the process.
pub struct LoopbackNetwork {
    latency: Duration,
    max_fee: u64,
    replies: mpsc::UnboundedSender<InboundMessage>,
    inbound: Mutex<Option<mpsc::UnboundedReceiver<InboundMessage>>>,
}

impl LoopbackNetwork {
    /// Create a network settling after `latency` with fees up to `max_fee`.
    pub fn new(latency: Duration, max_fee: u64) -> Self {
        let (replies, inbound) = mpsc::unbounded_channel();
        Self { latency, max_fee, replies, inbound: Mutex::new(Some(inbound)) }
    }

    fn outcome(&self, request: &PaymentRequest, fee: u64) -> PaymentStatus {
        if self.latency > request.timeout {
            PaymentStatus::Failed { reason: FailureReason::Timeout }
        } else if fee > request.fee_limit {
            PaymentStatus::Failed { reason: FailureReason::NoRoute }
        } else {
            PaymentStatus::Succeeded { fee }
        }
    }
}

impl PaymentClient for LoopbackNetwork {
    type Error = LoopbackError;

    fn send_payment(
        &self,
        request: PaymentRequest,
    ) -> impl Future<Output = Result<StatusStream<Self::Error>, Self::Error>> + Send {
        let fee = rand::rng().random_range(0..=self.max_fee);
        let outcome = self.outcome(&request, fee);
        let latency = self.latency;
        let replies = self.replies.clone();

        async move {
            let settled = async move {
                tokio::time::sleep(latency.min(request.timeout)).await;
                if matches!(outcome, PaymentStatus::Succeeded { .. }) {
                    let reply = InboundMessage {
                        sender: request.destination,
                        text: format!("echo: {}", request.text),
                        amount_received: request.amount,
                    };
                    tokio::spawn(async move {
                        tokio::time::sleep(latency).await;
                        if replies.send(reply).is_err() {
                            tracing::debug!("no inbound subscriber for reply");
                        }
                    });
                }
                Ok(outcome)
            };
            let updates = stream::iter([Ok(PaymentStatus::InFlight)]).chain(stream::once(settled));
            Ok(updates.boxed())
        }
    }

    fn subscribe_inbound(
        &self,
    ) -> impl Future<Output = Result<InboundStream<Self::Error>, Self::Error>> + Send {
        let inbound = self.inbound.lock().unwrap_or_else(PoisonError::into_inner).take();
        async move {
            let rx = inbound.ok_or(LoopbackError::AlreadySubscribed)?;
            let messages = stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|message| (Ok(message), rx))
            });
            Ok(messages.boxed())
        }
    }
}
