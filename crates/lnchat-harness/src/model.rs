//! Reference ledger model.
//!
//! Tracks what every peer's balance must be given the inbound credits and
//! successful sends a test produced, and compares it with a live session.

use std::collections::HashMap;

use lnchat_app::{Session, Settlement};
use lnchat_core::PeerId;

use crate::Violation;

/// Expected per-peer balances.
#[derive(Debug, Clone, Default)]
pub struct LedgerModel {
    expected: HashMap<PeerId, i64>,
}

impl LedgerModel {
    /// Create a model where every balance is zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record value received from `peer`.
    pub fn inbound(&mut self, peer: &PeerId, amount: u64) {
        let entry = self.expected.entry(peer.clone()).or_default();
        *entry = entry.saturating_add(to_signed(amount));
    }

    /// Record the outcome of a send to `peer`. Only paid sends move value.
    pub fn settled(&mut self, peer: &PeerId, settlement: &Settlement) {
        if let Settlement::Paid { amount, .. } = settlement {
            let entry = self.expected.entry(peer.clone()).or_default();
            *entry = entry.saturating_sub(to_signed(*amount));
        }
    }

    /// Expected balance for `peer`.
    pub fn balance(&self, peer: &PeerId) -> i64 {
        self.expected.get(peer).copied().unwrap_or(0)
    }

    /// Compare every modeled balance with `session`.
    pub fn verify(&self, session: &Session) -> Result<(), Violation> {
        for (peer, expected) in &self.expected {
            let actual = session.balance(peer);
            if actual != *expected {
                return Err(Violation {
                    invariant: "LedgerConservation",
                    message: format!("peer {}: expected {expected}, got {actual}", peer.short()),
                });
            }
        }
        Ok(())
    }
}

fn to_signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use lnchat_core::Ledger;

    use super::*;

    #[test]
    fn only_paid_sends_are_debited() {
        let peer = PeerId::from_bytes(&[3; 4], 4).unwrap();
        let mut model = LedgerModel::new();

        model.inbound(&peer, 500);
        model.settled(&peer, &Settlement::Paid { amount: 200, fee: 1 });
        model.settled(&peer, &Settlement::Resolved);

        assert_eq!(model.balance(&peer), 300);
    }

    #[test]
    fn extreme_amounts_clamp_like_the_ledger() {
        let peer = PeerId::from_bytes(&[4; 4], 4).unwrap();
        let mut model = LedgerModel::new();
        let mut ledger = Ledger::new();

        for _ in 0..2 {
            model.inbound(&peer, u64::MAX);
            ledger.credit(&peer, u64::MAX);
        }
        assert_eq!(model.balance(&peer), ledger.balance(&peer));

        for _ in 0..3 {
            model.settled(&peer, &Settlement::Paid { amount: u64::MAX, fee: 0 });
            ledger.debit(&peer, u64::MAX);
        }
        assert_eq!(model.balance(&peer), ledger.balance(&peer));
        assert_eq!(model.balance(&peer), i64::MIN);
    }
}
