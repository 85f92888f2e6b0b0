//! Outbound message delivery.
//!
//! Each chat line is carried by one payment. [`OutboundCoordinator::send`]
//! issues the payment and spawns a watcher task that follows its status
//! stream to a terminal state, then applies the outcome to the session in a
//! single locked update.

use std::sync::Arc;

use futures::StreamExt;
use lnchat_core::{LineIndex, PaymentRequest, PaymentStatus, PeerId, SendFailure};
use tokio::task::JoinHandle;

use crate::{
    PaymentClient,
    session::{Session, Settlement, wait_for_shutdown},
};

/// Issues payments for outbound chat lines and tracks their settlement.
pub struct OutboundCoordinator<P> {
    session: Session,
    client: Arc<P>,
}

impl<P> Clone for OutboundCoordinator<P> {
    fn clone(&self) -> Self {
        Self { session: self.session.clone(), client: Arc::clone(&self.client) }
    }
}

impl<P: PaymentClient> OutboundCoordinator<P> {
    /// Create a coordinator that sends through `client`.
    pub fn new(session: Session, client: Arc<P>) -> Self {
        Self { session, client }
    }

    /// Send `text` to `dest` and resolve `line` when the payment settles.
    ///
    /// Returns immediately. The returned handle yields the settlement that
    /// was applied to the session. Must be called from within a tokio
    /// runtime.
    pub fn send(&self, text: String, dest: PeerId, line: LineIndex) -> JoinHandle<Settlement> {
        let request = self.request(text, dest);
        tracing::debug!(
            line = line.get(),
            dest = %request.destination.short(),
            amount = request.amount,
            "issuing payment"
        );
        tokio::spawn(track(self.session.clone(), Arc::clone(&self.client), request, line))
    }

    fn request(&self, text: String, destination: PeerId) -> PaymentRequest {
        let config = self.session.config();
        PaymentRequest {
            amount: self.session.amount_for(&destination),
            text,
            destination,
            fee_limit: config.fee_limit,
            timeout: config.timeout,
            payment_hash: rand::random(),
            final_cltv_delta: config.final_cltv_delta,
        }
    }
}

/// Follow one payment to its outcome and apply it to the session.
///
/// Shutdown wins over a settlement that arrives in the same poll, so an
/// abandoned send is never recorded as paid.
async fn track<P: PaymentClient>(
    session: Session,
    client: Arc<P>,
    request: PaymentRequest,
    line: LineIndex,
) -> Settlement {
    let dest = request.destination.clone();
    let shutdown = session.shutdown_signal();

    let settlement = tokio::select! {
        biased;
        () = wait_for_shutdown(shutdown) => Settlement::Failed(SendFailure::Abandoned),
        settlement = settle(client.as_ref(), request) => settlement,
    };

    match &settlement {
        Settlement::Paid { amount, fee } => {
            tracing::info!(
                line = line.get(),
                dest = %dest.short(),
                amount,
                fee,
                "message delivered"
            );
        },
        Settlement::Resolved => {
            tracing::info!(
                line = line.get(),
                dest = %dest.short(),
                "message resolved without payment"
            );
        },
        Settlement::Failed(reason) => {
            tracing::warn!(line = line.get(), dest = %dest.short(), %reason, "message failed");
        },
    }

    if let Err(e) = session.settle(line, &dest, settlement.clone()) {
        tracing::warn!(line = line.get(), error = %e, "settlement not applied");
    }
    settlement
}

/// Drive the payment's status stream to a settlement.
async fn settle<P: PaymentClient>(client: &P, request: PaymentRequest) -> Settlement {
    let amount = request.amount;
    let mut updates = match client.send_payment(request).await {
        Ok(updates) => updates,
        Err(e) => return Settlement::Failed(SendFailure::Issue(e.to_string())),
    };

    while let Some(update) = updates.next().await {
        match update {
            Ok(PaymentStatus::InFlight) => tracing::debug!("payment in flight"),
            Ok(PaymentStatus::Succeeded { fee }) => return Settlement::Paid { amount, fee },
            Ok(PaymentStatus::FailedDetailMismatch) => return Settlement::Resolved,
            Ok(PaymentStatus::Failed { reason }) => {
                tracing::debug!(%reason, "payment failed at the network");
                return Settlement::Resolved;
            },
            Err(e) => return Settlement::Failed(SendFailure::SettlementStream(e.to_string())),
        }
    }
    Settlement::Failed(SendFailure::StreamEnded)
}
