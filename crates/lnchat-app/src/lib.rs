//! Session coordination for lnchat
//!
//! Shared session state and the tasks that mutate it concurrently: the
//! controller handling user input, one settlement watcher per outbound
//! message, and the inbound consumer. The payment network sits behind the
//! [`PaymentClient`] trait and the user interface behind [`Frontend`], so the
//! same coordination code runs in the terminal client and in tests.
//!
//! # Components
//!
//! - [`Session`]: mutex-guarded destination, ledger and conversation log
//! - [`SessionController`]: input dispatch and render snapshots
//! - [`OutboundCoordinator`]: payment issue and settlement tracking
//! - [`InboundCoordinator`]: inbound message consumer
//! - [`Runtime`]: event loop joining a [`Frontend`] to a session

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod command;
mod config;
mod controller;
mod error;
mod inbound;
mod outbound;
mod payment;
mod runtime;
mod session;

pub use command::{Command, DESTINATION_PREFIX};
pub use config::SessionConfig;
pub use controller::{SessionController, Submission};
pub use error::SessionError;
pub use inbound::InboundCoordinator;
pub use outbound::OutboundCoordinator;
pub use payment::{InboundStream, PaymentClient, StatusStream};
pub use runtime::{Frontend, FrontendEvent, Runtime};
pub use session::{InboundHealth, InboundReceipt, Session, SessionSnapshot, Settlement};
