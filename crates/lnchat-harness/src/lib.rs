//! Deterministic test harness for lnchat.
//!
//! Stand-ins for the collaborators a session talks to, so coordination code
//! can be exercised without a payment network or a terminal.
//!
//! # Components
//!
//! - [`ScriptedNetwork`]: [`lnchat_app::PaymentClient`] whose payments follow
//!   queued [`Script`]s and whose inbound feed is pushed by the test
//! - [`SimFrontend`]: [`lnchat_app::Frontend`] fed by a [`SimHandle`],
//!   recording every rendered snapshot
//! - [`LedgerModel`]: reference model of expected balances
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties that must hold for every
//! snapshot a renderer can observe. Use [`InvariantRegistry::standard()`] for
//! the full set.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod model;
pub mod scripted;
pub mod sim_frontend;

pub use invariants::{
    BalanceFollowsDestination, ClosedIsFinal, FeeOnlyWhenDelivered, InboundLinesDelivered,
    Invariant, InvariantRegistry, InvariantResult, PendingCountMatches, ResolvedLinesAreFinal,
    RevisionMonotonicity, SessionTrace, Violation,
};
pub use model::LedgerModel;
pub use scripted::{ManualSettlement, Script, ScriptedError, ScriptedNetwork};
pub use sim_frontend::{SimFrontend, SimFrontendError, SimHandle};
