// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord gateway adapter for the Ove relay.
//!
//! Connects a serenity client, converts incoming guild and direct messages
//! into [`InboundEvent`](ove_core::types::InboundEvent)s for the
//! [`Relay`], and delivers replies through [`DiscordSink`].

pub mod handler;
pub mod sink;

use std::sync::Arc;

use ove_agent::Relay;
use ove_config::model::DiscordConfig;
use ove_core::error::OveError;
use secrecy::{ExposeSecret, SecretString};
use serenity::all::{Client, GatewayIntents};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub use handler::DiscordHandler;
pub use sink::{split_message, DiscordSink, MAX_MESSAGE_CHARS};

/// Gateway intents needed to read message content in guilds and DMs.
pub fn intents(fetch_roster: bool) -> GatewayIntents {
    let base = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    if fetch_roster {
        base | GatewayIntents::GUILD_MEMBERS
    } else {
        base
    }
}

pub struct DiscordAdapter {
    token: SecretString,
    fetch_roster: bool,
}

impl DiscordAdapter {
    pub fn new(config: &DiscordConfig) -> Result<Self, OveError> {
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| OveError::Config("discord.token is required".to_string()))?;
        Ok(Self {
            token: SecretString::from(token.to_string()),
            fetch_roster: config.fetch_roster,
        })
    }

    /// Connect and process events until `cancel` fires or the gateway closes.
    pub async fn run(self, relay: Arc<Relay>, cancel: CancellationToken) -> Result<(), OveError> {
        let handler = DiscordHandler::new(relay, self.fetch_roster);
        let mut client = Client::builder(self.token.expose_secret(), intents(self.fetch_roster))
            .event_handler(handler)
            .await
            .map_err(|e| OveError::Channel {
                message: format!("failed to build Discord client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let shard_manager = Arc::clone(&client.shard_manager);
        let watcher = tokio::spawn(async move {
            cancel.cancelled().await;
            info!("closing Discord gateway");
            shard_manager.shutdown_all().await;
        });

        info!("connecting to Discord gateway");
        let result = client.start().await;
        watcher.abort();

        result.map_err(|e| {
            error!(error = %e, "Discord client stopped");
            OveError::Channel {
                message: format!("Discord gateway error: {e}"),
                source: Some(Box::new(e)),
            }
        })
    }
}
