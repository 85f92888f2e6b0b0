//! Generic runtime for driving a session from a front-end.
//!
//! The [`Runtime`] couples a [`Frontend`] (terminal, simulation) with a
//! [`SessionController`]. It waits on two sources at once: input events from
//! the front-end and revision notifications from the session, so settlements
//! and inbound messages are painted as soon as they land.

use std::future::Future;

use tokio::sync::watch;

use crate::{PaymentClient, SessionController, SessionSnapshot, Submission};

/// Input event produced by a front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendEvent {
    /// User entered a line.
    Submit(String),
    /// Front-end state changed (typing, resize) and needs repainting.
    Redraw,
    /// User asked to quit.
    Quit,
}

/// Abstracts user-facing I/O.
///
/// # Implementations
///
/// - **Terminal**: crossterm input and ratatui rendering
/// - **Simulation**: scripted input and recorded snapshots
pub trait Frontend {
    /// Front-end specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input event.
    ///
    /// Must be cancel-safe: the runtime drops the future whenever the
    /// session changes first.
    fn next_event(&mut self) -> impl Future<Output = Result<FrontendEvent, Self::Error>>;

    /// Paint a snapshot of the session.
    fn render(&mut self, snapshot: &SessionSnapshot) -> Result<(), Self::Error>;

    /// Release front-end resources.
    fn stop(&mut self);
}

/// Event loop that connects a front-end to a session.
pub struct Runtime<F, P> {
    frontend: F,
    controller: SessionController<P>,
}

impl<F, P> Runtime<F, P>
where
    F: Frontend,
    P: PaymentClient,
{
    /// Create a runtime for `controller`.
    pub fn new(frontend: F, controller: SessionController<P>) -> Self {
        Self { frontend, controller }
    }

    /// The session controller.
    pub fn controller(&self) -> &SessionController<P> {
        &self.controller
    }

    /// Run until the front-end quits or fails.
    ///
    /// The session is shut down and the front-end stopped on every exit
    /// path.
    ///
    /// # Errors
    ///
    /// Returns the front-end's error if reading input or rendering fails.
    pub async fn run(mut self) -> Result<(), F::Error> {
        let mut changes = self.controller.subscribe();
        let result = self.event_loop(&mut changes).await;

        self.controller.shutdown();
        self.frontend.stop();
        result
    }

    async fn event_loop(&mut self, changes: &mut watch::Receiver<u64>) -> Result<(), F::Error> {
        changes.mark_unchanged();
        self.render()?;

        loop {
            tokio::select! {
                event = self.frontend.next_event() => match event? {
                    FrontendEvent::Submit(line) => self.submit(&line),
                    FrontendEvent::Redraw => self.render()?,
                    FrontendEvent::Quit => return Ok(()),
                },
                changed = changes.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                    changes.mark_unchanged();
                    self.render()?;
                },
            }
        }
    }

    fn submit(&self, line: &str) {
        match self.controller.submit(line) {
            Ok(Submission::Dropped(reason)) => tracing::debug!(%reason, "input dropped"),
            Ok(_) => {},
            Err(e) => tracing::warn!(error = %e, "input refused"),
        }
    }

    fn render(&mut self) -> Result<(), F::Error> {
        let snapshot = self.controller.snapshot();
        self.frontend.render(&snapshot)
    }
}
