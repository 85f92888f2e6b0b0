//! Per-peer running balance.
//!
//! Value received from a peer is credited to its entry; value spent on a
//! successfully delivered message to that peer is debited. The balance sizes
//! the next outbound transfer, so a chatty peer that pays us a lot gets paid
//! back in kind instead of receiving the fixed floor amount.

use std::collections::HashMap;

use crate::PeerId;

/// Mapping from peer to signed balance in minor currency units.
///
/// Peers without an entry have a balance of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    balances: HashMap<PeerId, i64>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance for `peer`.
    pub fn balance(&self, peer: &PeerId) -> i64 {
        self.balances.get(peer).copied().unwrap_or(0)
    }

    /// Record value received from `peer`. Returns the new balance.
    pub fn credit(&mut self, peer: &PeerId, amount: u64) -> i64 {
        let entry = self.balances.entry(peer.clone()).or_insert(0);
        *entry = entry.saturating_add(to_signed(amount));
        *entry
    }

    /// Record value spent on `peer`. Returns the new balance.
    pub fn debit(&mut self, peer: &PeerId, amount: u64) -> i64 {
        let entry = self.balances.entry(peer.clone()).or_insert(0);
        *entry = entry.saturating_sub(to_signed(amount));
        *entry
    }

    /// Amount to attach to the next message for `peer`.
    ///
    /// The larger of the accumulated balance and `floor`. Zero or negative
    /// balances always pay the floor.
    pub fn amount_for(&self, peer: &PeerId, floor: u64) -> u64 {
        u64::try_from(self.balance(peer)).map_or(floor, |balance| balance.max(floor))
    }
}

fn to_signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(byte: u8) -> PeerId {
        PeerId::from_bytes(&[byte; 4], 4).unwrap()
    }

    #[test]
    fn unknown_peer_has_zero_balance() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance(&peer(1)), 0);
    }

    #[test]
    fn credit_then_debit_nets_out() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.credit(&peer(1), 2000), 2000);
        assert_eq!(ledger.debit(&peer(1), 500), 1500);
        assert_eq!(ledger.balance(&peer(2)), 0);
    }

    #[test]
    fn debit_below_zero_goes_negative() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.debit(&peer(1), 100), -100);
    }

    #[test]
    fn amount_uses_floor_for_small_or_negative_balance() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.amount_for(&peer(1), 100), 100);

        ledger.debit(&peer(1), 300);
        assert_eq!(ledger.amount_for(&peer(1), 100), 100);

        ledger.credit(&peer(1), 350);
        assert_eq!(ledger.amount_for(&peer(1), 100), 100);
    }

    #[test]
    fn amount_pays_forward_large_balance() {
        let mut ledger = Ledger::new();
        ledger.credit(&peer(1), 2000);
        assert_eq!(ledger.amount_for(&peer(1), 100), 2000);
    }

    #[test]
    fn huge_amounts_saturate() {
        let mut ledger = Ledger::new();
        ledger.credit(&peer(1), u64::MAX);
        ledger.credit(&peer(1), 1);
        assert_eq!(ledger.balance(&peer(1)), i64::MAX);
    }
}
