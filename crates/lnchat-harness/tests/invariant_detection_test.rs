//! The standard invariants against real and corrupted traces.
//!
//! A session driven through the scripted network must pass every check,
//! while hand-made snapshot sequences that break one rule must be reported
//! under that rule's name.

use std::{sync::Arc, time::Duration};

use lnchat_app::{InboundHealth, SessionConfig, SessionController, SessionSnapshot, Submission};
use lnchat_core::{ChatLine, ConversationLog, InboundMessage, PeerId};
use lnchat_harness::{InvariantRegistry, LedgerModel, Script, ScriptedNetwork, SessionTrace};

fn peer() -> PeerId {
    PeerId::parse_hex("0badcafe", 4).unwrap()
}

fn snapshot(revision: u64, log: &ConversationLog) -> SessionSnapshot {
    SessionSnapshot {
        revision,
        destination: None,
        balance: None,
        lines: log.iter().cloned().collect(),
        total_lines: log.len(),
        pending: log.pending_count(),
        inbound: InboundHealth::Listening,
        closed: false,
    }
}

fn violated(trace: &SessionTrace) -> Vec<&'static str> {
    match InvariantRegistry::standard().check_all(trace) {
        Ok(()) => Vec::new(),
        Err(violations) => violations.iter().map(|v| v.invariant).collect(),
    }
}

#[tokio::test]
async fn scripted_session_passes_all_checks() {
    let network = Arc::new(ScriptedNetwork::new());
    network.script(Script::succeed(3));
    network.script(Script::mismatch());
    network.push_inbound(InboundMessage {
        sender: peer(),
        text: "hey".into(),
        amount_received: 250,
    });

    let config = SessionConfig::default().with_peer_id_len(4);
    let controller = SessionController::new(config, Arc::clone(&network), Some(peer()));
    let mut changes = controller.subscribe();
    let mut trace = SessionTrace::single(controller.snapshot());
    let mut model = LedgerModel::new();

    let _inbound = controller.start();
    tokio::time::timeout(Duration::from_secs(5), async {
        while controller.snapshot().total_lines == 0 {
            changes.changed().await.unwrap();
        }
    })
    .await
    .unwrap();
    model.inbound(&peer(), 250);
    trace.record(controller.snapshot());

    for text in ["first", "second"] {
        let Submission::Sent { task, .. } = controller.submit(text).unwrap() else {
            panic!("expected a send for {text:?}");
        };
        trace.record(controller.snapshot());
        let settlement = task.await.unwrap();
        model.settled(&peer(), &settlement);
        trace.record(controller.snapshot());
    }

    controller.shutdown();
    trace.record(controller.snapshot());

    assert_eq!(violated(&trace), Vec::<&str>::new());
    model.verify(controller.session()).unwrap();
    // Oracle: inbound 250 credited, then the first send paid 250 forward.
    assert_eq!(controller.session().balance(&peer()), 0);
}

#[test]
fn reverted_delivery_is_caught() {
    let mut log = ConversationLog::new();
    let line = log.append(ChatLine::outbound("hello"));
    let pending = snapshot(1, &log);
    log.mark_delivered(line, 0).unwrap();
    let delivered = snapshot(2, &log);

    let mut trace = SessionTrace::new();
    trace.record(delivered);
    trace.record(SessionSnapshot { revision: 3, ..pending });

    assert_eq!(violated(&trace), vec!["ResolvedLinesAreFinal"]);
}

#[test]
fn revision_going_backwards_is_caught() {
    let log = ConversationLog::new();

    let mut trace = SessionTrace::new();
    trace.record(snapshot(5, &log));
    trace.record(snapshot(4, &log));

    assert_eq!(violated(&trace), vec!["RevisionMonotonicity"]);
}

#[test]
fn reopened_session_is_caught() {
    let log = ConversationLog::new();
    let closed = SessionSnapshot { closed: true, ..snapshot(1, &log) };

    let mut trace = SessionTrace::new();
    trace.record(closed);
    trace.record(snapshot(2, &log));

    assert_eq!(violated(&trace), vec!["ClosedIsFinal"]);
}

#[test]
fn balance_without_destination_is_caught() {
    let log = ConversationLog::new();
    let orphan = SessionSnapshot { balance: Some(10), ..snapshot(1, &log) };

    assert_eq!(violated(&SessionTrace::single(orphan)), vec!["BalanceFollowsDestination"]);
}
