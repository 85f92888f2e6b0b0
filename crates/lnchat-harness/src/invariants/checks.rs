//! Standard invariant checks.
//!
//! Single-snapshot checks guard what a renderer can see at any instant.
//! Cross-snapshot checks guard how a session may evolve.

use lnchat_core::Sender;

use super::{Invariant, InvariantResult, SessionTrace, trace::indexed_lines};

/// A fee is only ever visible on a delivered line.
///
/// A line showing a fee while pending or failed was observed half-updated.
pub struct FeeOnlyWhenDelivered;

impl Invariant for FeeOnlyWhenDelivered {
    fn name(&self) -> &'static str {
        "FeeOnlyWhenDelivered"
    }

    fn check(&self, trace: &SessionTrace) -> InvariantResult {
        for snapshot in trace.snapshots() {
            for (index, line) in indexed_lines(snapshot) {
                if line.fee_paid() > 0 && !line.delivered() {
                    return Err(self.violation(format!(
                        "revision {}: line {index} has fee {} but state {:?}",
                        snapshot.revision,
                        line.fee_paid(),
                        line.delivery()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Lines received from peers are delivered on arrival with no fee.
pub struct InboundLinesDelivered;

impl Invariant for InboundLinesDelivered {
    fn name(&self) -> &'static str {
        "InboundLinesDelivered"
    }

    fn check(&self, trace: &SessionTrace) -> InvariantResult {
        for snapshot in trace.snapshots() {
            for (index, line) in indexed_lines(snapshot) {
                if matches!(line.sender(), Sender::Peer(_))
                    && (!line.delivered() || line.fee_paid() != 0)
                {
                    return Err(self.violation(format!(
                        "revision {}: inbound line {index} is {:?}",
                        snapshot.revision,
                        line.delivery()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The pending counter agrees with the lines.
///
/// Exact when the snapshot holds the whole conversation, a lower bound
/// otherwise.
pub struct PendingCountMatches;

impl Invariant for PendingCountMatches {
    fn name(&self) -> &'static str {
        "PendingCountMatches"
    }

    fn check(&self, trace: &SessionTrace) -> InvariantResult {
        for snapshot in trace.snapshots() {
            let visible = snapshot.lines.iter().filter(|line| line.is_pending()).count();
            let complete = snapshot.lines.len() == snapshot.total_lines;
            let consistent = if complete {
                snapshot.pending == visible
            } else {
                snapshot.pending >= visible && snapshot.pending <= snapshot.total_lines
            };
            if !consistent {
                return Err(self.violation(format!(
                    "revision {}: pending {} but {visible} visible pending lines of {} ({} total)",
                    snapshot.revision,
                    snapshot.pending,
                    snapshot.lines.len(),
                    snapshot.total_lines
                )));
            }
        }
        Ok(())
    }
}

/// A balance is shown exactly when a destination is set.
pub struct BalanceFollowsDestination;

impl Invariant for BalanceFollowsDestination {
    fn name(&self) -> &'static str {
        "BalanceFollowsDestination"
    }

    fn check(&self, trace: &SessionTrace) -> InvariantResult {
        for snapshot in trace.snapshots() {
            if snapshot.balance.is_some() != snapshot.destination.is_some() {
                return Err(self.violation(format!(
                    "revision {}: destination {:?} with balance {:?}",
                    snapshot.revision, snapshot.destination, snapshot.balance
                )));
            }
        }
        Ok(())
    }
}

/// Revisions never decrease, and one revision always shows one state.
pub struct RevisionMonotonicity;

impl Invariant for RevisionMonotonicity {
    fn name(&self) -> &'static str {
        "RevisionMonotonicity"
    }

    fn check(&self, trace: &SessionTrace) -> InvariantResult {
        for pair in trace.snapshots().windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            if after.revision < before.revision {
                return Err(self.violation(format!(
                    "revision decreased {} → {}",
                    before.revision, after.revision
                )));
            }
            if after.revision == before.revision
                && after.lines.len() == before.lines.len()
                && after != before
            {
                return Err(self.violation(format!(
                    "revision {} observed with two different states",
                    after.revision
                )));
            }
        }
        Ok(())
    }
}

/// Lines are never rewritten, except a pending line reaching a terminal
/// state, and a terminal state is never left.
pub struct ResolvedLinesAreFinal;

impl Invariant for ResolvedLinesAreFinal {
    fn name(&self) -> &'static str {
        "ResolvedLinesAreFinal"
    }

    fn check(&self, trace: &SessionTrace) -> InvariantResult {
        for pair in trace.snapshots().windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            if after.total_lines < before.total_lines {
                return Err(self.violation(format!(
                    "line count shrank {} → {}",
                    before.total_lines, after.total_lines
                )));
            }

            let later: Vec<_> = indexed_lines(after).collect();
            for (index, old) in indexed_lines(before) {
                let Some((_, new)) = later.iter().find(|(i, _)| *i == index) else {
                    continue;
                };
                if old.sender() != new.sender() || old.text() != new.text() {
                    return Err(self.violation(format!("line {index} was rewritten")));
                }
                if old.delivery().is_terminal() && old.delivery() != new.delivery() {
                    return Err(self.violation(format!(
                        "line {index} left terminal state {:?} for {:?}",
                        old.delivery(),
                        new.delivery()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A closed session stays closed.
pub struct ClosedIsFinal;

impl Invariant for ClosedIsFinal {
    fn name(&self) -> &'static str {
        "ClosedIsFinal"
    }

    fn check(&self, trace: &SessionTrace) -> InvariantResult {
        for pair in trace.snapshots().windows(2) {
            if pair[0].closed && !pair[1].closed {
                return Err(self.violation(format!(
                    "session reopened at revision {}",
                    pair[1].revision
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lnchat_app::{InboundHealth, SessionSnapshot};
    use lnchat_core::{ChatLine, ConversationLog, PeerId};

    use super::*;

    fn peer() -> PeerId {
        PeerId::from_bytes(&[9; 4], 4).unwrap()
    }

    fn snapshot(revision: u64, log: &ConversationLog) -> SessionSnapshot {
        SessionSnapshot {
            revision,
            destination: Some(peer()),
            balance: Some(0),
            lines: log.iter().cloned().collect(),
            total_lines: log.len(),
            pending: log.pending_count(),
            inbound: InboundHealth::Listening,
            closed: false,
        }
    }

    #[test]
    fn resolution_of_pending_line_is_allowed() {
        let mut log = ConversationLog::new();
        let line = log.append(ChatLine::outbound("hello"));
        let mut trace = SessionTrace::single(snapshot(1, &log));
        log.mark_delivered(line, 3).unwrap();
        trace.record(snapshot(2, &log));

        assert!(ResolvedLinesAreFinal.check(&trace).is_ok());
        assert!(PendingCountMatches.check(&trace).is_ok());
    }

    #[test]
    fn leaving_terminal_state_is_a_violation() {
        let mut delivered = ConversationLog::new();
        let line = delivered.append(ChatLine::outbound("hello"));
        delivered.mark_delivered(line, 3).unwrap();

        let mut pending = ConversationLog::new();
        pending.append(ChatLine::outbound("hello"));

        let mut trace = SessionTrace::single(snapshot(2, &delivered));
        trace.record(snapshot(3, &pending));

        let violation = ResolvedLinesAreFinal.check(&trace).unwrap_err();
        assert_eq!(violation.invariant, "ResolvedLinesAreFinal");
    }

    #[test]
    fn decreasing_revision_is_a_violation() {
        let log = ConversationLog::new();
        let mut trace = SessionTrace::single(snapshot(5, &log));
        trace.record(snapshot(4, &log));

        assert!(RevisionMonotonicity.check(&trace).is_err());
    }

    #[test]
    fn balance_without_destination_is_a_violation() {
        let log = ConversationLog::new();
        let mut bad = snapshot(1, &log);
        bad.destination = None;

        assert!(BalanceFollowsDestination.check(&SessionTrace::single(bad)).is_err());
    }

    #[test]
    fn wrong_pending_count_is_a_violation() {
        let mut log = ConversationLog::new();
        log.append(ChatLine::outbound("hello"));
        let mut bad = snapshot(1, &log);
        bad.pending = 0;

        assert!(PendingCountMatches.check(&SessionTrace::single(bad)).is_err());
    }

    #[test]
    fn reopening_is_a_violation() {
        let log = ConversationLog::new();
        let mut closed = snapshot(1, &log);
        closed.closed = true;
        let mut trace = SessionTrace::single(closed);
        trace.record(snapshot(1, &log));

        assert!(ClosedIsFinal.check(&trace).is_err());
    }
}
