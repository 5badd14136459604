// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ChannelSink`] backed by the Discord REST API.

use std::sync::Arc;

use async_trait::async_trait;
use ove_core::error::OveError;
use ove_core::traits::{ChannelSink, PluginAdapter, TypingGuard};
use ove_core::types::{AdapterType, ChannelId, HealthStatus};
use serenity::all::{ChannelId as DiscordChannelId, Http};
use tracing::{debug, warn};

/// Discord's per-message character limit.
pub const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Clone)]
pub struct DiscordSink {
    http: Arc<Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Parse a snowflake string into a Discord channel id.
pub fn parse_channel_id(channel: &ChannelId) -> Result<DiscordChannelId, OveError> {
    match channel.0.parse::<u64>() {
        Ok(id) if id != 0 => Ok(DiscordChannelId::new(id)),
        _ => Err(OveError::Channel {
            message: format!("invalid Discord channel id `{channel}`"),
            source: None,
        }),
    }
}

/// Split `text` into pieces of at most `max_chars` characters, preferring to
/// break after a newline, then after whitespace, then anywhere.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some((limit, _)) = rest.char_indices().nth(max_chars) else {
            chunks.push(rest.to_string());
            break;
        };

        let window = &rest[..limit];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(char::is_whitespace))
            .map(|i| i + window[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(limit);

        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    chunks
}

#[async_trait]
impl PluginAdapter for DiscordSink {
    fn name(&self) -> &str {
        "discord"
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
impl ChannelSink for DiscordSink {
    async fn send(&self, channel: &ChannelId, text: &str) -> Result<(), OveError> {
        let target = parse_channel_id(channel)?;
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        debug!(channel_id = %channel, chunks = chunks.len(), "sending message");

        for chunk in chunks {
            target
                .say(&self.http, chunk)
                .await
                .map_err(|e| OveError::Channel {
                    message: format!("failed to send message: {e}"),
                    source: Some(Box::new(e)),
                })?;
        }
        Ok(())
    }

    fn start_typing(&self, channel: &ChannelId) -> TypingGuard {
        match parse_channel_id(channel) {
            Ok(target) => TypingGuard::new(target.start_typing(&self.http)),
            Err(e) => {
                warn!(error = %e, "cannot show typing indicator");
                TypingGuard::none()
            }
        }
    }
}
