// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the relay pipeline.
//!
//! The Horde tests run the real HTTP backend against a `wiremock` server and a
//! temp SQLite history store; only Discord is replaced by a recording sink.

use std::sync::Arc;

use ove_agent::{Handled, Relay, PONG};
use ove_config::OveConfig;
use ove_config::model::HistoryBackend;
use ove_core::traits::HistoryStore;
use ove_core::types::{ChannelId, EventId, InboundEvent, Reply, Role};
use ove_test_utils::{RecordingSink, TestHarness};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHANNEL: &str = "424242";

fn horde_config(server: &MockServer, db: &std::path::Path) -> OveConfig {
    let mut config = OveConfig::default();
    config.bot.name = "Ove".into();
    config.backend.base_url = server.uri();
    config.backend.models = vec!["Pygmalion-2-7b".into()];
    config.backend.poll_interval_ms = 10;
    config.backend.poll_retry_ms = 20;
    config.backend.timeout_secs = 5;
    config.history.backend = HistoryBackend::Sqlite;
    config.history.database_path = db.display().to_string();
    config
}

fn event(id: u32, text: &str) -> InboundEvent {
    InboundEvent {
        event_id: EventId(format!("msg-{id}")),
        channel_id: ChannelId::from(CHANNEL),
        author_id: "7".into(),
        author_is_bot: false,
        text: text.into(),
        roster: Vec::new(),
    }
}

async fn mount_capacity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/status/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "koboldcpp/Pygmalion-2-7b", "count": 2, "jobs": 1.0, "queued": 0.0, "eta": 4},
            {"name": "Unlisted-13b", "count": 9, "jobs": 0.0, "queued": 0.0, "eta": 1}
        ])))
        .mount(server)
        .await;
}

async fn mount_job(server: &MockServer, id: &str, text: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/generate/text/status/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "done": true,
            "faulted": false,
            "wait_time": 0,
            "generations": [{"text": text}]
        })))
        .mount(server)
        .await;
}

async fn build_relay(config: &OveConfig) -> (Arc<Relay>, Arc<dyn HistoryStore>) {
    let store = ove_storage::open_history_store(&config.history).await.unwrap();
    let backend = ove_inference::build_backend(config).unwrap();
    let relay = Relay::from_config(config, Arc::clone(&store), backend, CancellationToken::new()).unwrap();
    (Arc::new(relay), store)
}

#[tokio::test]
async fn horde_reply_reaches_channel_and_history() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_capacity(&server).await;

    Mock::given(method("POST"))
        .and(path("/generate/text/async"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "hey ove, how are you?",
            "models": ["koboldcpp/Pygmalion-2-7b"]
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({"id": "job-1"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_job(&server, "job-1", "  Doing great!  ").await;

    let config = horde_config(&server, &dir.path().join("ove.db"));
    let (relay, store) = build_relay(&config).await;
    let sink = RecordingSink::new();

    let handled = relay.handle(&event(1, "hey ove, how are you?"), &sink).await;
    assert!(matches!(handled, Handled::Replied(Reply::Generated(ref t)) if t == "Doing great!"));
    assert_eq!(sink.sent_texts().await, vec!["Doing great!"]);

    let doc = store.load(&ChannelId::from(CHANNEL)).await.unwrap().unwrap();
    let roles: Vec<Role> = doc.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
    assert_eq!(doc.messages[1].content, "Doing great!");
}

#[tokio::test]
async fn follow_up_sends_transcript_with_history() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_capacity(&server).await;

    Mock::given(method("POST"))
        .and(path("/generate/text/async"))
        .and(body_partial_json(serde_json::json!({"prompt": "ove hello"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({"id": "job-a"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate/text/async"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "User: ove hello\nOve: Hello!\nUser: what's new?\nOve:"
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({"id": "job-b"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_job(&server, "job-a", "Hello!").await;
    mount_job(&server, "job-b", "Not much.").await;

    let config = horde_config(&server, &dir.path().join("ove.db"));
    let (relay, _store) = build_relay(&config).await;
    let sink = RecordingSink::new();

    relay.handle(&event(1, "ove hello"), &sink).await;
    relay.handle(&event(2, "what's new?"), &sink).await;

    assert_eq!(sink.sent_texts().await, vec!["Hello!", "Not much."]);
}

#[tokio::test]
async fn history_survives_restart() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_capacity(&server).await;
    Mock::given(method("POST"))
        .and(path("/generate/text/async"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({"id": "job-r"})))
        .mount(&server)
        .await;
    mount_job(&server, "job-r", "Remembered.").await;

    let config = horde_config(&server, &dir.path().join("ove.db"));
    {
        let (relay, store) = build_relay(&config).await;
        relay.handle(&event(1, "ove remember this"), &RecordingSink::new()).await;
        store.shutdown().await.unwrap();
    }

    let (relay, _store) = build_relay(&config).await;
    let history = relay.conversations().get(&ChannelId::from(CHANNEL)).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "ove remember this");
    assert_eq!(history[1].content, "Remembered.");
}

#[tokio::test]
async fn faulted_job_sends_notice_without_storing_it() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_capacity(&server).await;
    Mock::given(method("POST"))
        .and(path("/generate/text/async"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({"id": "job-f"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/generate/text/status/job-f"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "done": false,
            "faulted": true,
            "state": {"status": "faulted", "error": "worker crashed"}
        })))
        .mount(&server)
        .await;

    let config = horde_config(&server, &dir.path().join("ove.db"));
    let (relay, store) = build_relay(&config).await;
    let sink = RecordingSink::new();

    let handled = relay.handle(&event(1, "ove tell me a story"), &sink).await;
    assert!(matches!(handled, Handled::Replied(Reply::Failed(_))));

    let sent = sink.sent_texts().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("⚠️"));
    assert!(sent[0].contains("worker crashed"));

    let doc = store.load(&ChannelId::from(CHANNEL)).await.unwrap().unwrap();
    assert!(doc.messages.iter().all(|m| m.role == Role::User));
}

#[tokio::test]
async fn rejected_submission_reports_overload() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_capacity(&server).await;
    Mock::given(method("POST"))
        .and(path("/generate/text/async"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({"message": "maintenance"})))
        .mount(&server)
        .await;

    let config = horde_config(&server, &dir.path().join("ove.db"));
    let (relay, _store) = build_relay(&config).await;
    let sink = RecordingSink::new();

    let handled = relay.handle(&event(1, "ove are you there"), &sink).await;
    assert!(matches!(handled, Handled::Replied(Reply::Failed(ove_core::types::Failure::Overloaded))));
    assert_eq!(sink.sent_texts().await.len(), 1);
}

#[tokio::test]
async fn ping_never_touches_the_backend() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let config = horde_config(&server, &dir.path().join("ove.db"));
    let (relay, _store) = build_relay(&config).await;
    let sink = RecordingSink::new();

    relay.handle(&event(1, "!ping"), &sink).await;
    assert_eq!(sink.sent_texts().await, vec![PONG]);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn harness_pipeline_with_mock_backend() {
    let harness = TestHarness::builder()
        .with_mock_replies(vec!["Hello from Ove!".to_string()])
        .build()
        .await
        .unwrap();

    harness.send("ove hi there").await;
    assert_eq!(harness.sent_texts().await, vec!["Hello from Ove!"]);

    let history = harness.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, Role::Assistant);
}
