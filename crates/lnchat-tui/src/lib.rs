//! Terminal UI for lnchat
//!
//! A thin shell over [`lnchat_app::Frontend`] that provides terminal-specific
//! I/O. All session logic lives in [`lnchat_app`]; this crate handles input
//! editing, rendering and the in-process loopback network used when no real
//! node is attached.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod input;
pub mod loopback;
pub mod terminal;
pub mod ui;

pub use error::RuntimeError;
pub use input::{InputAction, InputState, KeyInput};
pub use lnchat_app::{Frontend, FrontendEvent, Runtime, SessionConfig, SessionController};
pub use loopback::{LoopbackError, LoopbackNetwork};
pub use terminal::{TerminalError, TerminalFrontend};
