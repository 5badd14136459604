// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message handling: filtering, commands, activation, inference,
//! and reply delivery.

use std::sync::Arc;

use ove_config::model::OveConfig;
use ove_core::error::OveError;
use ove_core::traits::{ChannelSink, HistoryStore, InferenceBackend, TypingGuard};
use ove_core::types::{ChannelId, HistoryEntry, InboundEvent, Reply, Role};
use ove_inference::InferenceClient;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::activation::ChannelActivation;
use crate::conversation::ConversationStore;
use crate::mention::MentionResolver;

pub const PONG: &str = "pong";
pub const RESET_NOTICE: &str = "Conversation cleared. Say my name to start again.";

/// Relay knobs taken from `[bot]` and `[history]`.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub command_prefix: String,
    pub typing_indicator: bool,
    /// Entries of history sent along with each prompt.
    pub context_window: usize,
}

impl RelaySettings {
    pub fn from_config(config: &OveConfig) -> Self {
        Self {
            command_prefix: config.bot.command_prefix.clone(),
            typing_indicator: config.bot.typing_indicator,
            context_window: config.history.max_entries / 2,
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            command_prefix: "!".into(),
            typing_indicator: true,
            context_window: 10,
        }
    }
}

/// What [`Relay::handle`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    FromBot,
    Command(String),
    Duplicate,
    Dormant,
    Replied(Reply),
}

pub struct Relay {
    conversations: ConversationStore,
    activation: ChannelActivation,
    inference: InferenceClient,
    mentions: MentionResolver,
    settings: RelaySettings,
    cancel: CancellationToken,
}

impl Relay {
    pub fn new(
        conversations: ConversationStore,
        activation: ChannelActivation,
        inference: InferenceClient,
        settings: RelaySettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            conversations,
            activation,
            inference,
            mentions: MentionResolver::new(),
            settings,
            cancel,
        }
    }

    /// Wire a relay from configuration. `store` is ignored when history is disabled.
    pub fn from_config(
        config: &OveConfig,
        store: Arc<dyn HistoryStore>,
        backend: Arc<dyn InferenceBackend>,
        cancel: CancellationToken,
    ) -> Result<Self, OveError> {
        let conversations = if config.history.enabled {
            ConversationStore::new(store, config.history.max_entries)
        } else {
            ConversationStore::disabled()
        };
        let activation = ChannelActivation::new(&config.bot.trigger_word)?;
        let inference = InferenceClient::from_config(backend, config);

        info!(
            trigger_word = %config.bot.trigger_word,
            history = config.history.enabled,
            "relay initialized"
        );

        Ok(Self::new(
            conversations,
            activation,
            inference,
            RelaySettings::from_config(config),
            cancel,
        ))
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn activation(&self) -> &ChannelActivation {
        &self.activation
    }

    /// Run `handle` on its own task so intake never waits on the backend.
    pub fn dispatch(self: &Arc<Self>, event: InboundEvent, sink: Arc<dyn ChannelSink>) -> JoinHandle<Handled> {
        let relay = Arc::clone(self);
        tokio::spawn(async move {
            let handled = relay.handle(&event, sink.as_ref()).await;
            debug!(channel_id = %event.channel_id, event_id = %event.event_id, outcome = ?handled, "event handled");
            handled
        })
    }

    pub async fn handle(&self, event: &InboundEvent, sink: &dyn ChannelSink) -> Handled {
        if event.author_is_bot {
            return Handled::FromBot;
        }

        let channel = &event.channel_id;
        if let Some(command) = self.parse_command(&event.text) {
            self.run_command(&command, channel, sink).await;
            return Handled::Command(command);
        }

        if !self.activation.observe(channel, &event.event_id) {
            return Handled::Duplicate;
        }

        let prompt = event.text.trim();
        if !prompt.is_empty() {
            self.conversations.append(channel, Role::User, prompt).await;
        }

        if !self.activation.trigger(channel, prompt) {
            return Handled::Dormant;
        }

        let history = self.conversations.get(channel).await;
        let window = context_window(history, prompt, self.settings.context_window);

        let typing = if self.settings.typing_indicator {
            sink.start_typing(channel)
        } else {
            TypingGuard::none()
        };
        let reply = self.inference.respond(prompt, &window, &self.cancel).await;
        drop(typing);

        let reply = match reply {
            Reply::Generated(text) => {
                self.conversations
                    .append(channel, Role::Assistant, &text)
                    .await;
                Reply::Generated(self.mentions.resolve(&text, &event.roster))
            }
            failed @ Reply::Failed(_) => failed,
        };

        if let Err(e) = sink.send(channel, &reply.to_string()).await {
            warn!(channel_id = %channel, error = %e, "failed to deliver reply");
        }
        Handled::Replied(reply)
    }

    /// The lowercased command word, if `text` starts with the prefix.
    fn parse_command(&self, text: &str) -> Option<String> {
        let rest = text.trim_start().strip_prefix(&self.settings.command_prefix)?;
        let word = rest.split_whitespace().next().unwrap_or_default();
        Some(word.to_lowercase())
    }

    async fn run_command(&self, command: &str, channel: &ChannelId, sink: &dyn ChannelSink) {
        let response = match command {
            "ping" => PONG,
            "reset" => {
                self.conversations.reset(channel).await;
                self.activation.reset(channel);
                info!(channel_id = %channel, "channel reset");
                RESET_NOTICE
            }
            other => {
                debug!(channel_id = %channel, command = other, "ignoring unknown command");
                return;
            }
        };
        if let Err(e) = sink.send(channel, response).await {
            warn!(channel_id = %channel, error = %e, "failed to answer command");
        }
    }
}

/// The newest `size` entries before the current prompt.
///
/// The prompt was appended just before this is called (unless it repeated the
/// previous turn), so a trailing user entry equal to it is dropped.
fn context_window(mut history: Vec<HistoryEntry>, prompt: &str, size: usize) -> Vec<HistoryEntry> {
    if history
        .last()
        .is_some_and(|last| last.role == Role::User && last.content == prompt)
    {
        history.pop();
    }
    let skip = history.len().saturating_sub(size);
    history.drain(..skip);
    history
}
