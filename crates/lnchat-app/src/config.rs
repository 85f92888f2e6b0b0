//! Session configuration.

use std::time::Duration;

use lnchat_core::peer::DEFAULT_PEER_ID_LEN;

/// Tunables for a chat session.
///
/// Amounts are in minor currency units of the payment network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Minimum amount attached to every outbound message.
    pub floor_amount: u64,
    /// Maximum routing fee accepted per message.
    pub fee_limit: u64,
    /// Routing timeout handed to the payment client.
    pub timeout: Duration,
    /// CLTV delta required at the final hop.
    pub final_cltv_delta: u32,
    /// Byte length of peer identifiers on this network.
    pub peer_id_len: usize,
    /// Number of most recent lines included in a render snapshot.
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            floor_amount: 100,
            fee_limit: 100,
            timeout: Duration::from_secs(30),
            final_cltv_delta: 40,
            peer_id_len: DEFAULT_PEER_ID_LEN,
            history_limit: 500,
        }
    }
}

impl SessionConfig {
    /// Set the minimum amount attached to every outbound message.
    #[must_use]
    pub fn with_floor_amount(mut self, floor_amount: u64) -> Self {
        self.floor_amount = floor_amount;
        self
    }

    /// Set the maximum routing fee accepted per message.
    #[must_use]
    pub fn with_fee_limit(mut self, fee_limit: u64) -> Self {
        self.fee_limit = fee_limit;
        self
    }

    /// Set the routing timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the CLTV delta required at the final hop.
    #[must_use]
    pub fn with_final_cltv_delta(mut self, final_cltv_delta: u32) -> Self {
        self.final_cltv_delta = final_cltv_delta;
        self
    }

    /// Set the byte length of peer identifiers.
    #[must_use]
    pub fn with_peer_id_len(mut self, peer_id_len: usize) -> Self {
        self.peer_id_len = peer_id_len;
        self
    }

    /// Set how many recent lines a render snapshot includes.
    #[must_use]
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }
}
