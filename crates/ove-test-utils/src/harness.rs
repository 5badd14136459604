// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end relay testing.
//!
//! `TestHarness` assembles a [`Relay`] with a [`MockBackend`], a
//! [`RecordingSink`] and a history store (in-memory by default, a temp
//! SQLite file, or a [`FailingHistoryStore`]). `send()` drives one message
//! through the full pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ove_agent::{ChannelActivation, ConversationStore, Handled, Relay, RelaySettings};
use ove_core::error::OveError;
use ove_core::traits::HistoryStore;
use ove_core::types::{ChannelId, EventId, GenerationParams, HistoryEntry, InboundEvent, RosterMember};
use ove_inference::{InferenceClient, ModelSelector};
use ove_storage::{MemoryHistoryStore, SqliteHistoryStore};
use tokio_util::sync::CancellationToken;

use crate::failing_store::FailingHistoryStore;
use crate::mock_backend::{MockBackend, MockOutcome};
use crate::recording_sink::RecordingSink;

/// Channel used by [`TestHarness::send`].
pub const TEST_CHANNEL: &str = "test-channel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreKind {
    Memory,
    Sqlite,
    Failing,
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    outcomes: Vec<MockOutcome>,
    trigger_word: String,
    command_prefix: String,
    max_entries: usize,
    store: StoreKind,
    history_enabled: bool,
    timeout: Duration,
    roster: Vec<RosterMember>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            trigger_word: "ove".into(),
            command_prefix: "!".into(),
            max_entries: 20,
            store: StoreKind::Memory,
            history_enabled: true,
            timeout: Duration::from_secs(5),
            roster: Vec::new(),
        }
    }

    /// Set mock backend replies, used in order.
    pub fn with_mock_replies(mut self, replies: Vec<String>) -> Self {
        self.outcomes = replies.into_iter().map(MockOutcome::Reply).collect();
        self
    }

    pub fn with_outcomes(mut self, outcomes: Vec<MockOutcome>) -> Self {
        self.outcomes = outcomes;
        self
    }

    pub fn with_trigger_word(mut self, word: &str) -> Self {
        self.trigger_word = word.into();
        self
    }

    pub fn with_command_prefix(mut self, prefix: &str) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    pub fn with_history_limit(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_sqlite(mut self) -> Self {
        self.store = StoreKind::Sqlite;
        self
    }

    pub fn with_failing_store(mut self) -> Self {
        self.store = StoreKind::Failing;
        self
    }

    pub fn without_history(mut self) -> Self {
        self.history_enabled = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Roster attached to every event sent by the harness.
    pub fn with_roster(mut self, roster: Vec<RosterMember>) -> Self {
        self.roster = roster;
        self
    }

    /// Build the harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, OveError> {
        let mut temp_dir = None;
        let store: Arc<dyn HistoryStore> = match self.store {
            StoreKind::Memory => Arc::new(MemoryHistoryStore::new()),
            StoreKind::Failing => Arc::new(FailingHistoryStore),
            StoreKind::Sqlite => {
                let dir = tempfile::TempDir::new().map_err(|e| OveError::Storage { source: e.into() })?;
                let path = dir.path().join("test.db").to_string_lossy().to_string();
                let store = SqliteHistoryStore::open(&path).await?;
                temp_dir = Some(dir);
                Arc::new(store)
            }
        };

        let backend = Arc::new(MockBackend::with_outcomes(self.outcomes));
        let sink = Arc::new(RecordingSink::new());
        let cancel = CancellationToken::new();

        let conversations = if self.history_enabled {
            ConversationStore::new(Arc::clone(&store), self.max_entries)
        } else {
            ConversationStore::disabled()
        };
        let inference = InferenceClient::new(
            backend.clone(),
            ModelSelector::new(vec!["mock-model".into()], false, 3),
            GenerationParams::default(),
            self.timeout,
        )
        .with_poll_timing(Duration::from_millis(10), Duration::from_millis(20));
        let settings = RelaySettings {
            command_prefix: self.command_prefix,
            typing_indicator: true,
            context_window: self.max_entries / 2,
        };

        let relay = Relay::new(
            conversations,
            ChannelActivation::new(&self.trigger_word)?,
            inference,
            settings,
            cancel.clone(),
        );

        Ok(TestHarness {
            relay: Arc::new(relay),
            backend,
            sink,
            store,
            cancel,
            roster: self.roster,
            next_event: AtomicU64::new(1),
            _temp_dir: temp_dir,
        })
    }
}

/// A fully assembled relay with mock collaborators.
pub struct TestHarness {
    pub relay: Arc<Relay>,
    pub backend: Arc<MockBackend>,
    pub sink: Arc<RecordingSink>,
    pub store: Arc<dyn HistoryStore>,
    pub cancel: CancellationToken,
    roster: Vec<RosterMember>,
    next_event: AtomicU64,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Build a user event with a fresh id in [`TEST_CHANNEL`].
    pub fn event(&self, text: &str) -> InboundEvent {
        let n = self.next_event.fetch_add(1, Ordering::SeqCst);
        InboundEvent {
            event_id: EventId(format!("event-{n}")),
            channel_id: ChannelId::from(TEST_CHANNEL),
            author_id: "user-1".into(),
            author_is_bot: false,
            text: text.into(),
            roster: self.roster.clone(),
        }
    }

    /// Send one user message through the relay and wait for it to finish.
    pub async fn send(&self, text: &str) -> Handled {
        let event = self.event(text);
        self.send_event(&event).await
    }

    pub async fn send_event(&self, event: &InboundEvent) -> Handled {
        self.relay.handle(event, self.sink.as_ref()).await
    }

    /// Stored history of [`TEST_CHANNEL`].
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.relay
            .conversations()
            .get(&ChannelId::from(TEST_CHANNEL))
            .await
    }

    pub async fn sent_texts(&self) -> Vec<String> {
        self.sink.sent_texts().await
    }
}
