//! Shared session state.
//!
//! A [`Session`] owns the destination, the [`Ledger`] and the
//! [`ConversationLog`] for one run of the chat client. The controller, one
//! settlement watcher per in-flight message, and the inbound consumer all hold
//! clones of the same session and mutate it concurrently.
//!
//! # Synchronization
//!
//! Every read and write goes through one `std::sync::Mutex`. Critical sections
//! are short and synchronous: the lock is never held across an `.await`.
//! Each mutation bumps a revision counter and publishes it on a
//! [`watch`] channel while still holding the lock, so renderers can wait for
//! changes instead of polling and always see revisions in order.
//!
//! A snapshot is copied out under the same lock, so a line is never observed
//! half-resolved.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use lnchat_core::{
    ChatLine, ConversationLog, InboundFailure, InboundMessage, Ledger, LineIndex, LogError,
    PeerId, SendFailure,
};
use tokio::sync::watch;

use crate::{SessionConfig, SessionError};

/// Health of the inbound message path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundHealth {
    /// Subscription not yet established.
    Starting,
    /// Receiving messages.
    Listening,
    /// The stream ended cleanly. No more messages will arrive.
    Closed,
    /// The subscription failed. No more messages will arrive.
    Failed(InboundFailure),
}

impl InboundHealth {
    /// Returns true while messages can still arrive.
    pub fn is_receiving(&self) -> bool {
        matches!(self, Self::Starting | Self::Listening)
    }
}

impl fmt::Display for InboundHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => f.write_str("starting"),
            Self::Listening => f.write_str("listening"),
            Self::Closed => f.write_str("closed"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// How an outbound payment resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Payment succeeded. The line is delivered with `fee` and the ledger is
    /// debited by `amount`.
    Paid {
        /// Amount that was sent.
        amount: u64,
        /// Routing fee reported by the network.
        fee: u64,
    },
    /// Payment reached another terminal state. The line is delivered without
    /// a fee and the ledger is untouched.
    Resolved,
    /// Payment could not be tracked to a terminal state.
    Failed(SendFailure),
}

/// Result of recording an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundReceipt {
    /// Index of the appended line.
    pub line: LineIndex,
    /// Sender became the destination because none was set.
    pub bound_destination: bool,
    /// Sender's balance after the credit.
    pub balance: i64,
}

/// Consistent, read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Revision the snapshot was taken at.
    pub revision: u64,
    /// Current destination. `None` until one is chosen or bound.
    pub destination: Option<PeerId>,
    /// Ledger balance of the destination. `None` without a destination.
    pub balance: Option<i64>,
    /// Most recent lines in arrival order.
    pub lines: Vec<ChatLine>,
    /// Number of lines in the whole conversation.
    pub total_lines: usize,
    /// Number of outbound lines still waiting for settlement.
    pub pending: usize,
    /// Health of the inbound path.
    pub inbound: InboundHealth,
    /// Session has shut down.
    pub closed: bool,
}

/// Mutable state guarded by the session lock.
#[derive(Debug)]
struct SessionState {
    destination: Option<PeerId>,
    ledger: Ledger,
    log: ConversationLog,
    inbound: InboundHealth,
    closed: bool,
    revision: u64,
}

struct Inner {
    config: SessionConfig,
    state: Mutex<SessionState>,
    changes: watch::Sender<u64>,
    shutdown: watch::Sender<bool>,
}

/// Handle to the shared state of one chat session.
///
/// Cloning is cheap; all clones refer to the same state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Create a fresh session with no destination and an empty conversation.
    pub fn new(config: SessionConfig) -> Self {
        let state = SessionState {
            destination: None,
            ledger: Ledger::new(),
            log: ConversationLog::new(),
            inbound: InboundHealth::Starting,
            closed: false,
            revision: 0,
        };
        let (changes, _) = watch::channel(0);
        let (shutdown, _) = watch::channel(false);
        Self { inner: Arc::new(Inner { config, state: Mutex::new(state), changes, shutdown }) }
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // Every critical section leaves the state consistent, so a panic in
    // another holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the lock and publish a new revision if it changed
    /// anything.
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> (R, bool)) -> R {
        let mut state = self.lock();
        let (result, changed) = f(&mut *state);
        if changed {
            state.revision += 1;
            self.inner.changes.send_replace(state.revision);
        }
        result
    }

    /// Receiver that is notified with the new revision after every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    /// Current destination.
    pub fn destination(&self) -> Option<PeerId> {
        self.lock().destination.clone()
    }

    /// Ledger balance for `peer`.
    pub fn balance(&self, peer: &PeerId) -> i64 {
        self.lock().ledger.balance(peer)
    }

    /// Copy of the line at `index`.
    pub fn line(&self, index: LineIndex) -> Option<ChatLine> {
        self.lock().log.get(index).cloned()
    }

    /// Health of the inbound path.
    pub fn inbound_health(&self) -> InboundHealth {
        self.lock().inbound.clone()
    }

    /// Returns true after [`Session::shutdown`].
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Take a consistent snapshot including the last `limit` lines.
    pub fn snapshot(&self, limit: usize) -> SessionSnapshot {
        let state = self.lock();
        let balance = state.destination.as_ref().map(|dest| state.ledger.balance(dest));
        SessionSnapshot {
            revision: state.revision,
            destination: state.destination.clone(),
            balance,
            lines: state.log.tail(limit).to_vec(),
            total_lines: state.log.len(),
            pending: state.log.pending_count(),
            inbound: state.inbound.clone(),
            closed: state.closed,
        }
    }

    /// Stop the session.
    ///
    /// The inbound consumer stops and every in-flight send resolves as
    /// abandoned. Further input is refused. Idempotent.
    pub fn shutdown(&self) {
        let first = self.update(|state| {
            let first = !state.closed;
            state.closed = true;
            (first, first)
        });
        if first {
            tracing::info!("session shutting down");
            self.inner.shutdown.send_replace(true);
        }
    }

    /// Receiver that flips to `true` on shutdown.
    pub(crate) fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.inner.shutdown.subscribe()
    }

    /// Switch the destination. Returns false if it was already `peer`.
    pub(crate) fn set_destination(&self, peer: PeerId) -> bool {
        self.update(|state| {
            let changed = state.destination.as_ref() != Some(&peer);
            state.destination = Some(peer);
            (changed, changed)
        })
    }

    /// Append a pending outbound line addressed to the current destination.
    ///
    /// The destination check and the append happen under one lock, so the
    /// line is always addressed to the destination that was current when it
    /// was logged.
    pub(crate) fn record_outbound(&self, text: &str) -> Result<(PeerId, LineIndex), SessionError> {
        self.update(|state| {
            if state.closed {
                return (Err(SessionError::Closed), false);
            }
            let Some(dest) = state.destination.clone() else {
                return (Err(SessionError::NoDestinationSet), false);
            };
            let line = state.log.append(ChatLine::outbound(text));
            (Ok((dest, line)), true)
        })
    }

    /// Amount to attach to the next message for `dest`.
    pub(crate) fn amount_for(&self, dest: &PeerId) -> u64 {
        self.lock().ledger.amount_for(dest, self.inner.config.floor_amount)
    }

    /// Apply the outcome of an outbound payment to its line and the ledger.
    pub(crate) fn settle(
        &self,
        line: LineIndex,
        dest: &PeerId,
        settlement: Settlement,
    ) -> Result<(), LogError> {
        self.update(|state| {
            let result = match settlement {
                Settlement::Paid { amount, fee } => {
                    let result = state.log.mark_delivered(line, fee);
                    if result.is_ok() {
                        state.ledger.debit(dest, amount);
                    }
                    result
                },
                Settlement::Resolved => state.log.mark_delivered(line, 0),
                Settlement::Failed(reason) => state.log.mark_failed(line, reason),
            };
            let changed = result.is_ok();
            (result, changed)
        })
    }

    /// Record a message received from a peer.
    pub(crate) fn record_inbound(&self, message: InboundMessage) -> InboundReceipt {
        self.update(|state| {
            let bound_destination = state.destination.is_none();
            if bound_destination {
                state.destination = Some(message.sender.clone());
            }
            let balance = state.ledger.credit(&message.sender, message.amount_received);
            let line = state.log.append(ChatLine::inbound(message.sender, message.text));
            (InboundReceipt { line, bound_destination, balance }, true)
        })
    }

    /// Update the health of the inbound path.
    pub(crate) fn set_inbound_health(&self, health: InboundHealth) {
        self.update(|state| {
            let changed = state.inbound != health;
            state.inbound = health;
            ((), changed)
        });
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("state", &*self.lock()).finish_non_exhaustive()
    }
}

/// Resolve once `signal` reports shutdown.
///
/// Also resolves if the sending side is gone, since no shutdown can be
/// observed after that.
pub(crate) async fn wait_for_shutdown(mut signal: watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            return;
        }
    }
}
