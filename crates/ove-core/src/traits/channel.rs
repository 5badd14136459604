// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound side of a chat platform integration.

use std::any::Any;

use async_trait::async_trait;

use crate::error::OveError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ChannelId;

/// Keeps a platform "typing" indicator alive until dropped.
pub struct TypingGuard {
    _inner: Option<Box<dyn Any + Send>>,
}

impl TypingGuard {
    /// A guard for platforms (or tests) without a typing indicator.
    pub fn none() -> Self {
        Self { _inner: None }
    }

    /// Wraps a platform handle whose `Drop` stops the indicator.
    pub fn new<T: Send + 'static>(inner: T) -> Self {
        Self {
            _inner: Some(Box::new(inner)),
        }
    }
}

impl std::fmt::Debug for TypingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingGuard")
            .field("active", &self._inner.is_some())
            .finish()
    }
}

/// Message sink for a chat platform.
#[async_trait]
pub trait ChannelSink: PluginAdapter {
    /// Sends a text message to a channel.
    async fn send(&self, channel: &ChannelId, text: &str) -> Result<(), OveError>;

    /// Starts a typing indicator in the channel for the lifetime of the guard.
    fn start_typing(&self, channel: &ChannelId) -> TypingGuard;
}
