//! Ordered record of chat lines.
//!
//! The [`ConversationLog`] is append-only: lines are never removed or
//! reordered. The only mutation allowed after append is resolving an outbound
//! line's [`Delivery`] once, from `Pending` to `Delivered` or `Failed`.
//!
//! Delivery status and fee live in a single enum so that a reader can never
//! see a line marked delivered with a fee that has not been written yet.

use crate::{LogError, PeerId, SendFailure};

/// Author of a chat line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sender {
    /// Typed by the local user.
    Me,
    /// Received from a peer.
    Peer(PeerId),
}

/// Delivery state of a chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Payment carrying the message has not resolved yet.
    Pending,
    /// Payment resolved. `fee_paid` is the routing fee, zero unless the
    /// payment succeeded.
    Delivered {
        /// Routing fee in minor units.
        fee_paid: u64,
    },
    /// Payment could not be issued or tracked to a terminal status.
    Failed {
        /// What went wrong.
        reason: SendFailure,
    },
}

impl Delivery {
    /// Returns true for any state other than `Pending`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A single line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    sender: Sender,
    text: String,
    delivery: Delivery,
}

impl ChatLine {
    /// A line typed by the local user, waiting for its payment to resolve.
    pub fn outbound(text: impl Into<String>) -> Self {
        Self { sender: Sender::Me, text: text.into(), delivery: Delivery::Pending }
    }

    /// A line received from `peer`. Its payment has already settled.
    pub fn inbound(peer: PeerId, text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Peer(peer),
            text: text.into(),
            delivery: Delivery::Delivered { fee_paid: 0 },
        }
    }

    /// Author of the line.
    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    /// Message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Full delivery state.
    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    /// Returns true once the payment resolved (successfully or not).
    pub fn delivered(&self) -> bool {
        matches!(self.delivery, Delivery::Delivered { .. })
    }

    /// Routing fee paid, zero unless delivered.
    pub fn fee_paid(&self) -> u64 {
        match self.delivery {
            Delivery::Delivered { fee_paid } => fee_paid,
            Delivery::Pending | Delivery::Failed { .. } => 0,
        }
    }

    /// Returns true while waiting for the payment to resolve.
    pub fn is_pending(&self) -> bool {
        matches!(self.delivery, Delivery::Pending)
    }

    /// Failure reason if the line ended in the failed state.
    pub fn failure(&self) -> Option<&SendFailure> {
        match &self.delivery {
            Delivery::Failed { reason } => Some(reason),
            Delivery::Pending | Delivery::Delivered { .. } => None,
        }
    }
}

/// Position of a line in the log, handed out at append time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineIndex(usize);

impl LineIndex {
    /// Zero-based position in the log.
    pub fn get(self) -> usize {
        self.0
    }
}

/// Append-only list of chat lines in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    lines: Vec<ChatLine>,
    pending: usize,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line and return its index.
    pub fn append(&mut self, line: ChatLine) -> LineIndex {
        if line.is_pending() {
            self.pending += 1;
        }
        self.lines.push(line);
        LineIndex(self.lines.len() - 1)
    }

    /// Line at `index`.
    pub fn get(&self, index: LineIndex) -> Option<&ChatLine> {
        self.lines.get(index.0)
    }

    /// Resolve a pending outbound line as delivered with the given fee.
    pub fn mark_delivered(&mut self, index: LineIndex, fee_paid: u64) -> Result<(), LogError> {
        self.resolve(index, Delivery::Delivered { fee_paid })
    }

    /// Resolve a pending outbound line as failed.
    pub fn mark_failed(&mut self, index: LineIndex, reason: SendFailure) -> Result<(), LogError> {
        self.resolve(index, Delivery::Failed { reason })
    }

    fn resolve(&mut self, index: LineIndex, delivery: Delivery) -> Result<(), LogError> {
        let line = self.lines.get_mut(index.0).ok_or(LogError::UnknownLine(index.0))?;
        if line.sender != Sender::Me {
            return Err(LogError::NotOutbound(index.0));
        }
        if line.delivery.is_terminal() {
            return Err(LogError::AlreadyResolved(index.0));
        }
        line.delivery = delivery;
        self.pending -= 1;
        Ok(())
    }

    /// The last `n` lines in arrival order.
    pub fn tail(&self, n: usize) -> &[ChatLine] {
        let start = self.lines.len().saturating_sub(n);
        &self.lines[start..]
    }

    /// All lines in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &ChatLine> {
        self.lines.iter()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if nothing has been said yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines still waiting for their payment to resolve.
    pub fn pending_count(&self) -> usize {
        self.pending
    }
}
