// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the relay pipeline using the test harness.

use std::sync::Arc;
use std::time::Duration;

use ove_agent::{Handled, PONG, RESET_NOTICE};
use ove_core::traits::{ChannelSink, HistoryStore};
use ove_core::types::{ChannelId, Failure, HistoryEntry, ModelCandidate, Reply, Role, RosterMember};
use ove_test_utils::{MockOutcome, TestHarness, TEST_CHANNEL};

fn replies(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn dormant_channel_stores_but_does_not_reply() {
    let harness = TestHarness::builder().build().await.unwrap();

    assert_eq!(harness.send("just chatting").await, Handled::Dormant);
    assert!(harness.sent_texts().await.is_empty());
    assert_eq!(harness.backend.submit_count().await, 0);
    assert_eq!(harness.history().await, vec![HistoryEntry::user("just chatting")]);
}

#[tokio::test]
async fn trigger_word_activates_and_replies() {
    let harness = TestHarness::builder()
        .with_mock_replies(replies(&["Hej!", "Still here."]))
        .build()
        .await
        .unwrap();

    assert_eq!(
        harness.send("hello Ove").await,
        Handled::Replied(Reply::Generated("Hej!".into()))
    );
    // Once active, no trigger word is needed.
    assert_eq!(
        harness.send("how are you?").await,
        Handled::Replied(Reply::Generated("Still here.".into()))
    );
    assert_eq!(harness.sent_texts().await, vec!["Hej!", "Still here."]);
}

#[tokio::test]
async fn prompt_is_trimmed_and_excluded_from_context() {
    let harness = TestHarness::builder()
        .with_mock_replies(replies(&["first", "second"]))
        .build()
        .await
        .unwrap();

    harness.send("  ove, hi  ").await;
    harness.send("tell me more").await;

    let jobs = harness.backend.submitted_jobs().await;
    assert_eq!(jobs[0].prompt, "ove, hi");
    assert!(jobs[0].history.is_empty());
    assert_eq!(jobs[1].prompt, "tell me more");
    assert_eq!(
        jobs[1].history,
        vec![HistoryEntry::user("ove, hi"), HistoryEntry::assistant("first")]
    );
}

#[tokio::test]
async fn context_window_is_half_the_history_limit() {
    let harness = TestHarness::builder()
        .with_history_limit(6)
        .with_trigger_word("")
        .build()
        .await
        .unwrap();

    for i in 0..5 {
        harness.send(&format!("message {i}")).await;
    }

    let jobs = harness.backend.submitted_jobs().await;
    let last = jobs.last().unwrap();
    assert_eq!(last.history.len(), 3);
    assert!(harness.history().await.len() <= 6);
}

#[tokio::test]
async fn bot_messages_are_ignored() {
    let harness = TestHarness::builder().build().await.unwrap();
    let mut event = harness.event("ove, are you a bot?");
    event.author_is_bot = true;

    assert_eq!(harness.send_event(&event).await, Handled::FromBot);
    assert!(harness.history().await.is_empty());
    assert!(!harness.relay.activation().is_active(&ChannelId::from(TEST_CHANNEL)));
}

#[tokio::test]
async fn ping_answers_pong_without_activation() {
    let harness = TestHarness::builder().build().await.unwrap();

    assert_eq!(harness.send("!ping").await, Handled::Command("ping".into()));
    assert_eq!(harness.sent_texts().await, vec![PONG]);
    assert!(harness.history().await.is_empty());
}

#[tokio::test]
async fn commands_never_reach_the_trigger() {
    let harness = TestHarness::builder().build().await.unwrap();

    assert_eq!(harness.send("!ove").await, Handled::Command("ove".into()));
    assert!(!harness.relay.activation().is_active(&ChannelId::from(TEST_CHANNEL)));
    assert!(harness.sent_texts().await.is_empty());
}

#[tokio::test]
async fn custom_command_prefix() {
    let harness = TestHarness::builder()
        .with_command_prefix("?")
        .build()
        .await
        .unwrap();

    assert_eq!(harness.send("?PING").await, Handled::Command("ping".into()));
    assert_eq!(harness.sent_texts().await, vec![PONG]);
}

#[tokio::test]
async fn reset_clears_history_and_requires_trigger_again() {
    let harness = TestHarness::builder()
        .with_mock_replies(replies(&["hello"]))
        .build()
        .await
        .unwrap();

    harness.send("hi ove").await;
    assert!(!harness.history().await.is_empty());

    assert_eq!(harness.send("!reset").await, Handled::Command("reset".into()));
    assert!(harness.history().await.is_empty());
    assert_eq!(harness.send("are you there?").await, Handled::Dormant);
    assert_eq!(harness.sent_texts().await, vec!["hello", RESET_NOTICE]);
}

#[tokio::test]
async fn duplicate_delivery_is_handled_once() {
    let harness = TestHarness::builder()
        .with_mock_replies(replies(&["once"]))
        .build()
        .await
        .unwrap();

    let event = harness.event("ove?");
    assert!(matches!(harness.send_event(&event).await, Handled::Replied(_)));
    assert_eq!(harness.send_event(&event).await, Handled::Duplicate);
    assert_eq!(harness.backend.submit_count().await, 1);
    assert_eq!(harness.history().await.len(), 2);
}

#[tokio::test]
async fn failure_notice_is_sent_but_not_stored() {
    let harness = TestHarness::builder()
        .with_outcomes(vec![MockOutcome::Fault("worker exploded".into())])
        .build()
        .await
        .unwrap();

    let handled = harness.send("ove please").await;
    assert_eq!(
        handled,
        Handled::Replied(Reply::Failed(Failure::BackendFault("worker exploded".into())))
    );

    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("⚠️"), "got: {}", sent[0]);
    assert!(sent[0].contains("worker exploded"));
    assert!(harness.history().await.iter().all(|e| e.role == Role::User));
}

#[tokio::test]
async fn exhausted_candidates_report_overload() {
    let harness = TestHarness::builder()
        .with_outcomes(vec![MockOutcome::SubmitError("503".into())])
        .build()
        .await
        .unwrap();

    assert_eq!(
        harness.send("ove").await,
        Handled::Replied(Reply::Failed(Failure::Overloaded))
    );
}

#[tokio::test]
async fn stuck_job_times_out() {
    let harness = TestHarness::builder()
        .with_outcomes(vec![MockOutcome::Pending])
        .with_timeout(Duration::from_millis(200))
        .build()
        .await
        .unwrap();

    assert_eq!(
        harness.send("ove").await,
        Handled::Replied(Reply::Failed(Failure::Timeout(Duration::from_millis(200))))
    );
    assert_eq!(harness.backend.cancelled_jobs().await, vec!["mock-job-1".to_string()]);
}

#[tokio::test]
async fn live_capacity_picks_least_queued_model() {
    let harness = TestHarness::builder()
        .with_mock_replies(replies(&["ranked"]))
        .build()
        .await
        .unwrap();
    let candidate = |id: &str, workers: u32, queue_depth: u64| ModelCandidate {
        identifier: id.into(),
        workers,
        queue_depth,
        estimated_wait_secs: 0,
    };
    harness
        .backend
        .set_capacity(Ok(vec![
            candidate("busy-model", 4, 50),
            candidate("idle-model", 0, 0),
            candidate("quiet-model", 1, 2),
        ]))
        .await;

    assert_eq!(
        harness.send("ove").await,
        Handled::Replied(Reply::Generated("ranked".into()))
    );
    let jobs = harness.backend.submitted_jobs().await;
    assert_eq!(jobs[0].model.as_deref(), Some("quiet-model"));
}

#[tokio::test]
async fn failed_capacity_query_uses_fallback_model() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.backend.set_capacity(Err("status endpoint down".into())).await;

    assert!(matches!(harness.send("ove").await, Handled::Replied(Reply::Generated(_))));
    let jobs = harness.backend.submitted_jobs().await;
    assert_eq!(jobs[0].model.as_deref(), Some("mock-model"));
}

#[tokio::test]
async fn typing_scope_closes_after_inference() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness.send("ove").await;
    assert_eq!(harness.sink.typing_started(), 1);
    assert_eq!(harness.sink.typing_active(), 0);
}

#[tokio::test]
async fn mentions_are_resolved_in_replies_only() {
    let roster = vec![RosterMember {
        id: "42".into(),
        username: "alice".into(),
        display_name: Some("Alice".into()),
    }];
    let harness = TestHarness::builder()
        .with_mock_replies(replies(&["say hi to @{alice}"]))
        .with_roster(roster)
        .build()
        .await
        .unwrap();

    harness.send("ove").await;
    assert_eq!(harness.sent_texts().await, vec!["say hi to <@42>"]);
    // History keeps the model's own wording.
    assert_eq!(
        harness.history().await.last(),
        Some(&HistoryEntry::assistant("say hi to @{alice}"))
    );
}

#[tokio::test]
async fn failing_store_does_not_break_replies() {
    let harness = TestHarness::builder()
        .with_failing_store()
        .with_mock_replies(replies(&["still works", "and again"]))
        .build()
        .await
        .unwrap();

    harness.send("ove").await;
    harness.send("more").await;
    assert_eq!(harness.sent_texts().await, vec!["still works", "and again"]);

    let jobs = harness.backend.submitted_jobs().await;
    assert_eq!(
        jobs[1].history,
        vec![HistoryEntry::user("ove"), HistoryEntry::assistant("still works")]
    );
}

#[tokio::test]
async fn sqlite_history_is_persisted() {
    let harness = TestHarness::builder()
        .with_sqlite()
        .with_mock_replies(replies(&["persisted"]))
        .build()
        .await
        .unwrap();

    harness.send("ove").await;
    let document = harness
        .store
        .load(&ChannelId::from(TEST_CHANNEL))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        document.messages,
        vec![HistoryEntry::user("ove"), HistoryEntry::assistant("persisted")]
    );
}

#[tokio::test]
async fn history_disabled_sends_no_context() {
    let harness = TestHarness::builder()
        .without_history()
        .with_mock_replies(replies(&["a", "b"]))
        .build()
        .await
        .unwrap();

    harness.send("ove").await;
    harness.send("again").await;
    let jobs = harness.backend.submitted_jobs().await;
    assert!(jobs.iter().all(|j| j.history.is_empty()));
}

#[tokio::test]
async fn send_failure_is_logged_not_fatal() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.sink.fail_sends(true);

    assert!(matches!(harness.send("ove").await, Handled::Replied(Reply::Generated(_))));
}

#[tokio::test]
async fn cancelled_relay_reports_cancellation() {
    let harness = TestHarness::builder()
        .with_outcomes(vec![MockOutcome::Pending])
        .build()
        .await
        .unwrap();
    harness.cancel.cancel();

    assert_eq!(
        harness.send("ove").await,
        Handled::Replied(Reply::Failed(Failure::Cancelled))
    );
}

#[tokio::test]
async fn dispatch_runs_on_its_own_task() {
    let harness = TestHarness::builder()
        .with_mock_replies(replies(&["spawned"]))
        .build()
        .await
        .unwrap();

    let event = harness.event("ove");
    let sink: Arc<dyn ChannelSink> = harness.sink.clone();
    let handled = harness.relay.dispatch(event, sink).await.unwrap();

    assert_eq!(handled, Handled::Replied(Reply::Generated("spawned".into())));
    assert_eq!(harness.sent_texts().await, vec!["spawned"]);
}

#[tokio::test]
async fn concurrent_channels_do_not_interfere() {
    let harness = Arc::new(
        TestHarness::builder()
            .with_trigger_word("")
            .build()
            .await
            .unwrap(),
    );

    let mut tasks = Vec::new();
    for channel in 0..8 {
        let harness = Arc::clone(&harness);
        tasks.push(tokio::spawn(async move {
            let mut event = harness.event("hello");
            event.channel_id = ChannelId(format!("channel-{channel}"));
            harness.send_event(&event).await
        }));
    }
    for task in tasks {
        assert!(matches!(task.await.unwrap(), Handled::Replied(Reply::Generated(_))));
    }
    assert_eq!(harness.backend.submit_count().await, 8);
}

mod bounds {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn history_never_exceeds_limit(limit in 2usize..8, messages in prop::collection::vec("[a-z ]{0,6}", 1..30)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let harness = TestHarness::builder()
                    .with_trigger_word("")
                    .with_history_limit(limit)
                    .build()
                    .await
                    .unwrap();
                for text in &messages {
                    harness.send(text).await;
                    let history = harness.history().await;
                    assert!(history.len() <= limit, "{} > {}", history.len(), limit);
                    for pair in history.windows(2) {
                        assert!(pair[0] != pair[1], "adjacent duplicates stored");
                    }
                }
            });
        }
    }
}
