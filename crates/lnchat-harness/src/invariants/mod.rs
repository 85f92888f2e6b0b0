//! Invariant checking over session snapshots.
//!
//! Invariants are properties that must hold for every snapshot a renderer can
//! observe, and across consecutive snapshots of one session. They are checked
//! against a [`SessionTrace`] rather than live state, so every check sees the
//! same consistent view.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let mut trace = SessionTrace::new();
//! trace.record(controller.snapshot());
//! registry.check_all(&trace)?;
//! ```

mod checks;
mod trace;

pub use checks::{
    BalanceFollowsDestination, ClosedIsFinal, FeeOnlyWhenDelivered, InboundLinesDelivered,
    PendingCountMatches, ResolvedLinesAreFinal, RevisionMonotonicity,
};
pub use trace::SessionTrace;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property that must hold for every observed session state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the recorded snapshots.
    fn check(&self, trace: &SessionTrace) -> InvariantResult;

    /// Build a violation of this invariant.
    fn violation(&self, message: String) -> Violation {
        Violation { invariant: self.name(), message }
    }
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with every session invariant.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(FeeOnlyWhenDelivered);
        registry.add(InboundLinesDelivered);
        registry.add(PendingCountMatches);
        registry.add(BalanceFollowsDestination);
        registry.add(RevisionMonotonicity);
        registry.add(ResolvedLinesAreFinal);
        registry.add(ClosedIsFinal);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against `trace`.
    ///
    /// Returns every violation found.
    pub fn check_all(&self, trace: &SessionTrace) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(trace).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation.
    #[allow(clippy::panic, reason = "Test assertion helper")]
    pub fn assert_all(&self, trace: &SessionTrace, context: &str) {
        if let Err(violations) = self.check_all(trace) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
