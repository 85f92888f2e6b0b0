//! End-to-end session scenarios against the scripted network.
//!
//! Each test drives a [`SessionController`] the way a front-end would and
//! checks the resulting snapshot, ledger and issued payment requests.

use std::{sync::Arc, time::Duration};

use lnchat_app::{
    InboundHealth, SessionConfig, SessionController, SessionError, SessionSnapshot, Settlement,
    Submission,
};
use lnchat_core::{
    Delivery, FailureReason, InboundFailure, InboundMessage, LineIndex, PeerId, PeerIdError,
    SendFailure, Sender,
};
use lnchat_harness::{InvariantRegistry, Script, ScriptedNetwork, SessionTrace};
use tokio::task::JoinHandle;

fn config() -> SessionConfig {
    SessionConfig::default().with_peer_id_len(4)
}

fn peer(hex: &str) -> PeerId {
    PeerId::parse_hex(hex, 4).unwrap()
}

fn controller(
    destination: Option<PeerId>,
) -> (SessionController<ScriptedNetwork>, Arc<ScriptedNetwork>) {
    let network = Arc::new(ScriptedNetwork::new());
    (SessionController::new(config(), Arc::clone(&network), destination), network)
}

fn inbound(sender: &PeerId, text: &str, amount: u64) -> InboundMessage {
    InboundMessage { sender: sender.clone(), text: text.into(), amount_received: amount }
}

fn sent(submission: Result<Submission, SessionError>) -> (LineIndex, JoinHandle<Settlement>) {
    match submission {
        Ok(Submission::Sent { line, task }) => (line, task),
        other => panic!("expected a send, got {other:?}"),
    }
}

async fn wait_until<P: lnchat_app::PaymentClient>(
    controller: &SessionController<P>,
    done: impl Fn(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    let mut changes = controller.subscribe();
    let wait = async {
        loop {
            let snapshot = controller.snapshot();
            if done(&snapshot) {
                return snapshot;
            }
            changes.changed().await.unwrap();
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait).await.unwrap()
}

fn assert_invariants(snapshot: SessionSnapshot) {
    InvariantRegistry::standard().assert_all(&SessionTrace::single(snapshot), "final state");
}

#[tokio::test]
async fn destination_command_sets_destination_only() {
    let (controller, network) = controller(None);

    let submission = controller.submit("/aa11bb22").unwrap();

    assert!(matches!(submission, Submission::DestinationChanged(p) if p == peer("aa11bb22")));
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.destination, Some(peer("aa11bb22")));
    assert_eq!(snapshot.total_lines, 0);
    assert_eq!(network.request_count(), 0);
}

#[tokio::test]
async fn successful_send_pays_fee_and_debits_ledger() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(Some(d.clone()));
    network.script(Script::succeed(5));

    let (line, task) = sent(controller.submit("hello"));

    // Pending until the watcher runs
    let pending = controller.snapshot();
    assert_eq!(pending.lines[line.get()].text(), "hello");
    assert_eq!(pending.lines[line.get()].sender(), &Sender::Me);
    assert!(pending.lines[line.get()].is_pending());
    assert_eq!(pending.pending, 1);

    let settlement = task.await.unwrap();
    assert_eq!(settlement, Settlement::Paid { amount: 100, fee: 5 });

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.lines[line.get()].delivery(), &Delivery::Delivered { fee_paid: 5 });
    assert_eq!(snapshot.balance, Some(-100));
    assert_eq!(snapshot.pending, 0);

    let requests = network.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "hello");
    assert_eq!(requests[0].amount, 100);
    assert_eq!(requests[0].destination, d);
    assert_eq!(requests[0].fee_limit, 100);
    assert_eq!(requests[0].timeout, Duration::from_secs(30));
    assert_eq!(requests[0].final_cltv_delta, 40);
    assert_invariants(snapshot);
}

#[tokio::test]
async fn inbound_binds_destination_and_credits_sender() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(None);
    let _inbound = controller.start();

    network.push_inbound(inbound(&d, "hi", 2000));
    let snapshot = wait_until(&controller, |s| s.total_lines == 1).await;

    assert_eq!(snapshot.destination, Some(d.clone()));
    assert_eq!(snapshot.balance, Some(2000));
    assert_eq!(snapshot.lines[0].sender(), &Sender::Peer(d));
    assert_eq!(snapshot.lines[0].text(), "hi");
    assert_eq!(snapshot.lines[0].delivery(), &Delivery::Delivered { fee_paid: 0 });
    assert_eq!(snapshot.inbound, InboundHealth::Listening);
    assert_invariants(snapshot);
}

#[tokio::test]
async fn inbound_balance_sizes_next_payment() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(None);
    let _inbound = controller.start();
    network.push_inbound(inbound(&d, "hi", 2000));
    wait_until(&controller, |s| s.total_lines == 1).await;

    let (_, task) = sent(controller.submit("thanks"));
    assert_eq!(task.await.unwrap(), Settlement::Paid { amount: 2000, fee: 0 });

    // Oracle: balance pays forward, then returns to zero
    assert_eq!(network.requests()[0].amount, 2000);
    assert_eq!(controller.session().balance(&d), 0);
}

#[tokio::test]
async fn negative_balance_falls_back_to_floor() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(Some(d.clone()));

    for text in ["one", "two"] {
        let (_, task) = sent(controller.submit(text));
        task.await.unwrap();
    }

    let amounts: Vec<_> = network.requests().iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![100, 100]);
    assert_eq!(controller.session().balance(&d), -200);
}

#[tokio::test]
async fn detail_mismatch_resolves_without_fee() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(Some(d.clone()));
    network.script(Script::mismatch());

    let (line, task) = sent(controller.submit("hello"));
    assert_eq!(task.await.unwrap(), Settlement::Resolved);

    let resolved = controller.session().line(line).unwrap();
    assert!(resolved.delivered());
    assert_eq!(resolved.fee_paid(), 0);
    assert_eq!(controller.session().balance(&d), 0);
}

#[tokio::test]
async fn network_failure_resolves_without_fee() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(Some(d.clone()));
    network.script(Script::fail(FailureReason::NoRoute));

    let (line, task) = sent(controller.submit("hello"));
    assert_eq!(task.await.unwrap(), Settlement::Resolved);

    assert_eq!(
        controller.session().line(line).map(|l| l.delivery().clone()),
        Some(Delivery::Delivered { fee_paid: 0 })
    );
    assert_eq!(controller.session().balance(&d), 0);
}

#[tokio::test]
async fn issue_failure_marks_line_failed() {
    let (controller, network) = controller(Some(peer("aa11bb22")));
    network.script(Script::IssueFailure("no channel".into()));

    let (line, task) = sent(controller.submit("hello"));
    task.await.unwrap();

    let failed = controller.session().line(line).unwrap();
    assert!(!failed.delivered());
    assert!(!failed.is_pending());
    assert_eq!(failed.failure(), Some(&SendFailure::Issue("no channel".into())));
    assert_eq!(controller.snapshot().pending, 0);
}

#[tokio::test]
async fn stream_error_marks_line_failed() {
    let (controller, network) = controller(Some(peer("aa11bb22")));
    network.script(Script::stream_error("connection reset"));

    let (line, task) = sent(controller.submit("hello"));
    task.await.unwrap();

    assert_eq!(
        controller.session().line(line).unwrap().failure(),
        Some(&SendFailure::SettlementStream("connection reset".into()))
    );
}

#[tokio::test]
async fn stream_end_without_terminal_marks_line_failed() {
    let (controller, network) = controller(Some(peer("aa11bb22")));
    network.script(Script::stream_end());

    let (line, task) = sent(controller.submit("hello"));
    assert_eq!(task.await.unwrap(), Settlement::Failed(SendFailure::StreamEnded));

    assert_eq!(controller.session().line(line).unwrap().failure(), Some(&SendFailure::StreamEnded));
}

#[tokio::test]
async fn in_flight_then_mismatch_resolves_without_fee() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(Some(d.clone()));
    let settlement = network.script_manual();

    let (line, task) = sent(controller.submit("hello"));
    assert_eq!(controller.snapshot().pending, 1);
    settlement.in_flight();
    settlement.mismatch();

    assert_eq!(task.await.unwrap(), Settlement::Resolved);
    let resolved = controller.session().line(line).unwrap();
    assert_eq!(resolved.delivery(), &Delivery::Delivered { fee_paid: 0 });
    assert_eq!(controller.session().balance(&d), 0);
}

#[tokio::test]
async fn in_flight_then_stream_error_marks_line_failed() {
    let (controller, network) = controller(Some(peer("aa11bb22")));
    let settlement = network.script_manual();

    let (line, task) = sent(controller.submit("hello"));
    settlement.in_flight();
    settlement.error("peer went away");

    let failure = SendFailure::SettlementStream("peer went away".into());
    assert_eq!(task.await.unwrap(), Settlement::Failed(failure.clone()));
    assert_eq!(controller.session().line(line).unwrap().failure(), Some(&failure));
    assert_eq!(controller.snapshot().pending, 0);
}

#[tokio::test]
async fn input_is_taken_as_typed() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(Some(d.clone()));

    // Oracle: the prefix only counts in the first column
    let (_, slash) = sent(controller.submit(" /cc33dd44"));
    slash.await.unwrap();
    let (_, indented) = sent(controller.submit("   indented text  "));
    indented.await.unwrap();

    let texts: Vec<_> = network.requests().into_iter().map(|r| r.text).collect();
    assert_eq!(texts, vec![" /cc33dd44", "   indented text  "]);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.destination, Some(d));
    assert_eq!(snapshot.lines[1].text(), "   indented text  ");
}

#[tokio::test]
async fn invalid_destination_is_dropped_without_changes() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(Some(d.clone()));
    let before = controller.snapshot();

    let bad_hex = controller.submit("/not-hex").unwrap();
    let bad_len = controller.submit("/aa11").unwrap();

    assert!(matches!(
        bad_hex,
        Submission::Dropped(SessionError::InvalidDestination { reason: PeerIdError::Hex(_), .. })
    ));
    assert!(matches!(
        bad_len,
        Submission::Dropped(SessionError::InvalidDestination {
            reason: PeerIdError::Length { expected: 4, actual: 2 },
            ..
        })
    ));
    // Oracle: nothing observable changed
    assert_eq!(controller.snapshot(), before);
    assert_eq!(network.request_count(), 0);
}

#[tokio::test]
async fn message_without_destination_is_dropped() {
    let (controller, network) = controller(None);

    let submission = controller.submit("hello").unwrap();

    assert!(matches!(submission, Submission::Dropped(SessionError::NoDestinationSet)));
    assert_eq!(controller.snapshot().total_lines, 0);
    assert_eq!(network.request_count(), 0);
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let (controller, _network) = controller(Some(peer("aa11bb22")));

    assert!(matches!(controller.submit("   "), Ok(Submission::Ignored)));
    assert_eq!(controller.snapshot().revision, 1, "only the initial destination");
}

#[tokio::test]
async fn switching_destination_keeps_history() {
    let d = peer("aa11bb22");
    let e = peer("cc33dd44");
    let (controller, network) = controller(Some(d.clone()));

    let (_, first) = sent(controller.submit("to d"));
    first.await.unwrap();
    controller.submit("/cc33dd44").unwrap();
    let (_, second) = sent(controller.submit("to e"));
    second.await.unwrap();

    let destinations: Vec<_> = network.requests().into_iter().map(|r| r.destination).collect();
    assert_eq!(destinations, vec![d, e.clone()]);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.destination, Some(e));
    assert_eq!(snapshot.total_lines, 2);
}

#[tokio::test]
async fn later_inbound_sender_does_not_rebind() {
    let d = peer("aa11bb22");
    let e = peer("cc33dd44");
    let (controller, network) = controller(None);
    let _inbound = controller.start();

    network.push_inbound(inbound(&d, "first", 10));
    network.push_inbound(inbound(&e, "second", 20));
    let snapshot = wait_until(&controller, |s| s.total_lines == 2).await;

    assert_eq!(snapshot.destination, Some(d));
    assert_eq!(snapshot.balance, Some(10));
    assert_eq!(controller.session().balance(&e), 20);
}

#[tokio::test]
async fn settlement_order_does_not_reorder_lines() {
    let d = peer("aa11bb22");
    let (controller, network) = controller(Some(d.clone()));
    let _inbound = controller.start();
    let first = network.script_manual();
    let second = network.script_manual();

    let (a, a_task) = sent(controller.submit("a"));
    network.push_inbound(inbound(&d, "b", 50));
    wait_until(&controller, |s| s.total_lines == 2).await;
    let (c, c_task) = sent(controller.submit("c"));

    second.succeed(2);
    c_task.await.unwrap();
    first.succeed(1);
    a_task.await.unwrap();

    let snapshot = controller.snapshot();
    let texts: Vec<_> = snapshot.lines.iter().map(|l| l.text().to_owned()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
    assert_eq!(snapshot.lines[a.get()].fee_paid(), 1);
    assert_eq!(snapshot.lines[c.get()].fee_paid(), 2);
    assert_invariants(snapshot);
}

#[tokio::test]
async fn inbound_close_is_reported() {
    let (controller, network) = controller(None);
    let inbound_task = controller.start();

    network.close_inbound();
    inbound_task.await.unwrap();

    assert_eq!(controller.session().inbound_health(), InboundHealth::Closed);
}

#[tokio::test]
async fn inbound_error_is_reported_and_outbound_keeps_working() {
    let (controller, network) = controller(Some(peer("aa11bb22")));
    let inbound_task = controller.start();

    network.fail_inbound("peer reset");
    inbound_task.await.unwrap();

    assert_eq!(
        controller.session().inbound_health(),
        InboundHealth::Failed(InboundFailure::Stream("peer reset".into()))
    );
    let (_, task) = sent(controller.submit("still here"));
    assert!(matches!(task.await.unwrap(), Settlement::Paid { .. }));
}

#[tokio::test]
async fn subscribe_failure_is_reported() {
    let (controller, network) = controller(None);
    network.fail_subscribe("not connected");

    controller.start().await.unwrap();

    assert_eq!(
        controller.session().inbound_health(),
        InboundHealth::Failed(InboundFailure::Subscribe("not connected".into()))
    );
}

#[tokio::test]
async fn snapshot_is_limited_to_recent_history() {
    let d = peer("aa11bb22");
    let network = Arc::new(ScriptedNetwork::new());
    let controller =
        SessionController::new(config().with_history_limit(2), Arc::clone(&network), None);
    let _inbound = controller.start();

    for text in ["one", "two", "three"] {
        network.push_inbound(inbound(&d, text, 1));
    }
    let snapshot = wait_until(&controller, |s| s.total_lines == 3).await;

    let texts: Vec<_> = snapshot.lines.iter().map(|l| l.text().to_owned()).collect();
    assert_eq!(texts, vec!["two", "three"]);
    assert_invariants(snapshot);
}
