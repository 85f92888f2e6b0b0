//! Session controller: the entry point for user input.
//!
//! The controller owns destination selection and dispatches each submitted
//! line either to a destination switch or to the [`OutboundCoordinator`].
//! It also starts the inbound consumer and hands out render snapshots.

use std::sync::Arc;

use lnchat_core::{LineIndex, PeerId};
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    Command, InboundCoordinator, OutboundCoordinator, PaymentClient, Session, SessionConfig,
    SessionError, SessionSnapshot, Settlement,
};

/// Outcome of [`SessionController::submit`].
#[derive(Debug)]
pub enum Submission {
    /// Blank input, nothing happened.
    Ignored,
    /// Destination switched to this peer.
    DestinationChanged(PeerId),
    /// Line appended and its payment dispatched.
    Sent {
        /// Index of the pending line.
        line: LineIndex,
        /// Settlement watcher. Dropping it detaches the task.
        task: JoinHandle<Settlement>,
    },
    /// Input was dropped without touching the session.
    Dropped(SessionError),
}

/// Drives one chat session.
pub struct SessionController<P> {
    session: Session,
    client: Arc<P>,
    outbound: OutboundCoordinator<P>,
}

impl<P: PaymentClient> SessionController<P> {
    /// Create a session talking through `client`.
    ///
    /// `destination` preselects the peer to talk to. Without one, the first
    /// inbound sender becomes the destination.
    pub fn new(config: SessionConfig, client: Arc<P>, destination: Option<PeerId>) -> Self {
        let session = Session::new(config);
        if let Some(peer) = destination {
            tracing::info!(dest = %peer.short(), "initial destination");
            session.set_destination(peer);
        }
        let outbound = OutboundCoordinator::new(session.clone(), Arc::clone(&client));
        Self { session, client, outbound }
    }

    /// Start consuming inbound messages.
    ///
    /// Call once per session from within a tokio runtime.
    pub fn start(&self) -> JoinHandle<()> {
        InboundCoordinator::new(self.session.clone()).start(Arc::clone(&self.client))
    }

    /// Handle one line of user input.
    ///
    /// Malformed destinations and chat text without a destination are
    /// dropped and reported as [`Submission::Dropped`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] after [`SessionController::shutdown`].
    pub fn submit(&self, input: &str) -> Result<Submission, SessionError> {
        if self.session.is_closed() {
            return Err(SessionError::Closed);
        }

        match Command::parse(input) {
            Command::Empty => Ok(Submission::Ignored),
            Command::SetDestination(target) => {
                match PeerId::parse_hex(target, self.session.config().peer_id_len) {
                    Ok(peer) => {
                        self.set_destination(peer.clone());
                        Ok(Submission::DestinationChanged(peer))
                    },
                    Err(reason) => {
                        tracing::debug!(input = target, %reason, "ignoring invalid destination");
                        Ok(Submission::Dropped(SessionError::InvalidDestination {
                            input: target.to_owned(),
                            reason,
                        }))
                    },
                }
            },
            Command::Message(text) => match self.session.record_outbound(text) {
                Ok((dest, line)) => {
                    let task = self.outbound.send(text.to_owned(), dest, line);
                    Ok(Submission::Sent { line, task })
                },
                Err(SessionError::Closed) => Err(SessionError::Closed),
                Err(e) => {
                    tracing::debug!(reason = %e, "dropping message");
                    Ok(Submission::Dropped(e))
                },
            },
        }
    }

    /// Switch the destination to `peer`.
    ///
    /// Returns false if `peer` already was the destination.
    pub fn set_destination(&self, peer: PeerId) -> bool {
        let dest = peer.short();
        let changed = self.session.set_destination(peer);
        if changed {
            tracing::info!(dest = %dest, "destination changed");
        }
        changed
    }

    /// Shared session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Snapshot with the configured number of recent lines.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot(self.session.config().history_limit)
    }

    /// Revision notifications for renderers.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.session.subscribe()
    }

    /// Stop the session. See [`Session::shutdown`].
    pub fn shutdown(&self) {
        self.session.shutdown();
    }
}
