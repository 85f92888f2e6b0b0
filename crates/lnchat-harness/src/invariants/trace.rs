//! Recorded snapshot history of one session.

use lnchat_app::SessionSnapshot;
use lnchat_core::ChatLine;

/// Snapshots of one session in the order they were taken.
#[derive(Debug, Clone, Default)]
pub struct SessionTrace {
    snapshots: Vec<SessionSnapshot>,
}

impl SessionTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trace holding a single snapshot.
    pub fn single(snapshot: SessionSnapshot) -> Self {
        Self { snapshots: vec![snapshot] }
    }

    /// Append a snapshot.
    pub fn record(&mut self, snapshot: SessionSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// All recorded snapshots.
    pub fn snapshots(&self) -> &[SessionSnapshot] {
        &self.snapshots
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> Option<&SessionSnapshot> {
        self.snapshots.last()
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Lines of `snapshot` paired with their position in the whole conversation.
pub(crate) fn indexed_lines(
    snapshot: &SessionSnapshot,
) -> impl Iterator<Item = (usize, &ChatLine)> {
    let first = snapshot.total_lines.saturating_sub(snapshot.lines.len());
    snapshot.lines.iter().enumerate().map(move |(offset, line)| (first + offset, line))
}
