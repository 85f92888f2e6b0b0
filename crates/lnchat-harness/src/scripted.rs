//! Scripted payment network.
//!
//! [`ScriptedNetwork`] implements [`PaymentClient`] without any real network.
//! Each outbound payment consumes the next queued [`Script`], which decides
//! what the status stream yields. Inbound messages are injected by the test
//! through the same handle.
//!
//! Payments issued with an empty script queue succeed with a zero fee.

use std::{
    collections::VecDeque,
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
};

use futures::{StreamExt, stream};
use lnchat_app::{InboundStream, PaymentClient, StatusStream};
use lnchat_core::{FailureReason, InboundMessage, PaymentRequest, PaymentStatus};
use thiserror::Error;
use tokio::sync::mpsc;

/// Error produced by the scripted network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ScriptedError(pub String);

type StatusItem = Result<PaymentStatus, ScriptedError>;
type InboundItem = Result<InboundMessage, ScriptedError>;

/// Behavior of one outbound payment.
#[derive(Debug)]
pub enum Script {
    /// Yield these updates, then end the stream.
    Statuses(Vec<StatusItem>),
    /// Refuse to issue the payment.
    IssueFailure(String),
    /// Never yield anything. The payment stays in flight forever.
    Hang,
    /// Yield whatever the paired [`ManualSettlement`] sends.
    Manual(mpsc::UnboundedReceiver<StatusItem>),
}

impl Script {
    /// In flight, then succeeded with `fee`.
    pub fn succeed(fee: u64) -> Self {
        Self::Statuses(vec![Ok(PaymentStatus::InFlight), Ok(PaymentStatus::Succeeded { fee })])
    }

    /// Terminal delivery-detail mismatch.
    pub fn mismatch() -> Self {
        Self::Statuses(vec![Ok(PaymentStatus::InFlight), Ok(PaymentStatus::FailedDetailMismatch)])
    }

    /// Terminal failure reported by the network.
    pub fn fail(reason: FailureReason) -> Self {
        Self::Statuses(vec![Ok(PaymentStatus::InFlight), Ok(PaymentStatus::Failed { reason })])
    }

    /// The status stream errors after one in-flight update.
    pub fn stream_error(message: &str) -> Self {
        Self::Statuses(vec![Ok(PaymentStatus::InFlight), Err(ScriptedError(message.to_owned()))])
    }

    /// The status stream ends without a terminal update.
    pub fn stream_end() -> Self {
        Self::Statuses(vec![Ok(PaymentStatus::InFlight)])
    }

    fn into_stream(self) -> Result<StatusStream<ScriptedError>, ScriptedError> {
        match self {
            Self::Statuses(updates) => Ok(stream::iter(updates).boxed()),
            Self::IssueFailure(reason) => Err(ScriptedError(reason)),
            Self::Hang => Ok(stream::pending().boxed()),
            Self::Manual(rx) => Ok(receiver_stream(rx)),
        }
    }
}

/// Test-side handle of a [`Script::Manual`] payment.
///
/// Dropping the handle ends the status stream.
#[derive(Debug)]
pub struct ManualSettlement {
    tx: mpsc::UnboundedSender<StatusItem>,
}

impl ManualSettlement {
    /// Emit an in-flight update.
    pub fn in_flight(&self) {
        self.emit(Ok(PaymentStatus::InFlight));
    }

    /// Emit a success with `fee`.
    pub fn succeed(&self, fee: u64) {
        self.emit(Ok(PaymentStatus::Succeeded { fee }));
    }

    /// Emit a delivery-detail mismatch.
    pub fn mismatch(&self) {
        self.emit(Ok(PaymentStatus::FailedDetailMismatch));
    }

    /// Emit a stream error.
    pub fn error(&self, message: &str) {
        self.emit(Err(ScriptedError(message.to_owned())));
    }

    fn emit(&self, item: StatusItem) {
        // The watcher may already be gone after shutdown
        if self.tx.send(item).is_err() {
            tracing::debug!("manual settlement has no receiver");
        }
    }
}

#[derive(Default)]
struct NetworkState {
    scripts: VecDeque<Script>,
    requests: Vec<PaymentRequest>,
    subscribe_failure: Option<String>,
    inbound_rx: Option<mpsc::UnboundedReceiver<InboundItem>>,
    inbound_tx: Option<mpsc::UnboundedSender<InboundItem>>,
}

/// Deterministic [`PaymentClient`] for tests.
pub struct ScriptedNetwork {
    state: Mutex<NetworkState>,
}

impl Default for ScriptedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedNetwork {
    /// Create a network with no scripts and an open inbound feed.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let state =
            NetworkState { inbound_rx: Some(rx), inbound_tx: Some(tx), ..NetworkState::default() };
        Self { state: Mutex::new(state) }
    }

    fn lock(&self) -> MutexGuard<'_, NetworkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the behavior of the next unscripted payment.
    pub fn script(&self, script: Script) {
        self.lock().scripts.push_back(script);
    }

    /// Queue a manually driven payment and return its handle.
    pub fn script_manual(&self) -> ManualSettlement {
        let (tx, rx) = mpsc::unbounded_channel();
        self.script(Script::Manual(rx));
        ManualSettlement { tx }
    }

    /// Make the next inbound subscription fail.
    pub fn fail_subscribe(&self, reason: &str) {
        self.lock().subscribe_failure = Some(reason.to_owned());
    }

    /// Deliver an inbound message to the subscriber.
    pub fn push_inbound(&self, message: InboundMessage) {
        self.send_inbound(Ok(message));
    }

    /// Make the inbound stream yield an error.
    pub fn fail_inbound(&self, message: &str) {
        self.send_inbound(Err(ScriptedError(message.to_owned())));
    }

    /// End the inbound stream after any queued messages.
    pub fn close_inbound(&self) {
        self.lock().inbound_tx = None;
    }

    fn send_inbound(&self, item: InboundItem) {
        let state = self.lock();
        let delivered = state.inbound_tx.as_ref().is_some_and(|tx| tx.send(item).is_ok());
        if !delivered {
            tracing::debug!("inbound feed closed, message discarded");
        }
    }

    /// Every payment request issued so far, in order.
    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.lock().requests.clone()
    }

    /// Number of payment requests issued so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }
}

impl PaymentClient for ScriptedNetwork {
    type Error = ScriptedError;

    fn send_payment(
        &self,
        request: PaymentRequest,
    ) -> impl Future<Output = Result<StatusStream<Self::Error>, Self::Error>> + Send {
        let script = {
            let mut state = self.lock();
            state.requests.push(request);
            state.scripts.pop_front().unwrap_or_else(|| Script::succeed(0))
        };
        async move { script.into_stream() }
    }

    fn subscribe_inbound(
        &self,
    ) -> impl Future<Output = Result<InboundStream<Self::Error>, Self::Error>> + Send {
        let subscription = {
            let mut state = self.lock();
            match state.subscribe_failure.take() {
                Some(reason) => Err(ScriptedError(reason)),
                None => state
                    .inbound_rx
                    .take()
                    .map(receiver_stream)
                    .ok_or_else(|| ScriptedError("already subscribed".into())),
            }
        };
        async move { subscription }
    }
}

fn receiver_stream<T: Send + 'static>(
    rx: mpsc::UnboundedReceiver<T>,
) -> futures::stream::BoxStream<'static, T> {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) }).boxed()
}
