// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel sink that records everything sent through it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use ove_core::error::OveError;
use ove_core::traits::{ChannelSink, PluginAdapter, TypingGuard};
use ove_core::types::{AdapterType, ChannelId, HealthStatus};

/// A sent message as seen by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: ChannelId,
    pub text: String,
}

pub struct RecordingSink {
    sent: Mutex<Vec<SentMessage>>,
    typing_started: AtomicUsize,
    typing_active: Arc<AtomicUsize>,
    fail_sends: AtomicBool,
}

struct TypingScope(Arc<AtomicUsize>);

impl Drop for TypingScope {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            typing_started: AtomicUsize::new(0),
            typing_active: Arc::new(AtomicUsize::new(0)),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// Make every later `send` fail (after recording the attempt).
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().await.iter().map(|m| m.text.clone()).collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }

    /// Number of typing scopes opened so far.
    pub fn typing_started(&self) -> usize {
        self.typing_started.load(Ordering::SeqCst)
    }

    /// Number of typing scopes still open.
    pub fn typing_active(&self) -> usize {
        self.typing_active.load(Ordering::SeqCst)
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for RecordingSink {
    fn name(&self) -> &str {
        "recording-sink"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, OveError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OveError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelSink for RecordingSink {
    async fn send(&self, channel: &ChannelId, text: &str) -> Result<(), OveError> {
        self.sent.lock().await.push(SentMessage {
            channel: channel.clone(),
            text: text.to_string(),
        });
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(OveError::Channel {
                message: "recording sink configured to fail".into(),
                source: None,
            });
        }
        Ok(())
    }

    fn start_typing(&self, _channel: &ChannelId) -> TypingGuard {
        self.typing_started.fetch_add(1, Ordering::SeqCst);
        self.typing_active.fetch_add(1, Ordering::SeqCst);
        TypingGuard::new(TypingScope(Arc::clone(&self.typing_active)))
    }
}
