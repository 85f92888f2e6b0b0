//! Simulation front-end implementing the Frontend trait.
//!
//! `SimFrontend` stands in for the terminal so the same
//! [`lnchat_app::Runtime`] loop runs under test. Input events are injected
//! through a [`SimHandle`]; every rendered snapshot is recorded and,
//! optionally, checked against an [`InvariantRegistry`].

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use lnchat_app::{Frontend, FrontendEvent, SessionSnapshot};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{InvariantRegistry, SessionTrace, Violation};

/// Error type for the simulation front-end.
#[derive(Error, Debug)]
pub enum SimFrontendError {
    /// A rendered snapshot broke an invariant.
    #[error("invariants violated: {}", joined(.0))]
    Invariants(Vec<Violation>),
}

fn joined(violations: &[Violation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Default)]
struct Shared {
    trace: SessionTrace,
}

/// Front-end driven by a test.
pub struct SimFrontend {
    events: mpsc::UnboundedReceiver<FrontendEvent>,
    shared: Arc<Mutex<Shared>>,
    stopped: Arc<AtomicBool>,
    invariants: Option<InvariantRegistry>,
}

/// Test-side handle of a [`SimFrontend`].
#[derive(Clone)]
pub struct SimHandle {
    events: mpsc::UnboundedSender<FrontendEvent>,
    shared: Arc<Mutex<Shared>>,
    stopped: Arc<AtomicBool>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimFrontend {
    /// Create a front-end and the handle that drives it.
    pub fn new() -> (Self, SimHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(Shared::default()));
        let stopped = Arc::new(AtomicBool::new(false));
        let frontend = Self {
            events: rx,
            shared: Arc::clone(&shared),
            stopped: Arc::clone(&stopped),
            invariants: None,
        };
        (frontend, SimHandle { events: tx, shared, stopped })
    }

    /// Check every rendered snapshot against `registry`.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }
}

impl Frontend for SimFrontend {
    type Error = SimFrontendError;

    /// Next injected event. Quits once every handle is dropped.
    async fn next_event(&mut self) -> Result<FrontendEvent, Self::Error> {
        Ok(self.events.recv().await.unwrap_or(FrontendEvent::Quit))
    }

    fn render(&mut self, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
        let mut shared = lock(&self.shared);
        shared.trace.record(snapshot.clone());
        match &self.invariants {
            Some(registry) => {
                registry.check_all(&shared.trace).map_err(SimFrontendError::Invariants)
            },
            None => Ok(()),
        }
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

impl SimHandle {
    fn inject(&self, event: FrontendEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("front-end gone, event discarded");
        }
    }

    /// Type a line and press enter.
    pub fn submit(&self, line: &str) {
        self.inject(FrontendEvent::Submit(line.to_owned()));
    }

    /// Ask for a repaint.
    pub fn redraw(&self) {
        self.inject(FrontendEvent::Redraw);
    }

    /// Ask the runtime to quit.
    pub fn quit(&self) {
        self.inject(FrontendEvent::Quit);
    }

    /// Every snapshot rendered so far.
    pub fn trace(&self) -> SessionTrace {
        lock(&self.shared).trace.clone()
    }

    /// Most recently rendered snapshot.
    pub fn last_render(&self) -> Option<SessionSnapshot> {
        lock(&self.shared).trace.latest().cloned()
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> usize {
        lock(&self.shared).trace.len()
    }

    /// Returns true once the runtime stopped the front-end.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
