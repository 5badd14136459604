// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway event handler: turns Discord messages into relay events.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use ove_agent::Relay;
use ove_core::types::{ChannelId, EventId, InboundEvent, RosterMember};
use serenity::all::{Context, EventHandler, GuildId, Member, Message, Ready, User, UserId};
use tracing::{debug, info, warn};

use crate::sink::DiscordSink;

pub struct DiscordHandler {
    relay: Arc<Relay>,
    fetch_roster: bool,
}

impl DiscordHandler {
    pub fn new(relay: Arc<Relay>, fetch_roster: bool) -> Self {
        Self {
            relay,
            fetch_roster,
        }
    }

    /// Guild members from the cache, falling back to a REST fetch.
    async fn guild_roster(&self, ctx: &Context, guild_id: GuildId) -> Vec<RosterMember> {
        let cached: Option<Vec<RosterMember>> = ctx.cache.guild(guild_id).map(|guild| {
            guild.members.values().map(member_entry).collect()
        });

        match cached {
            Some(roster) if !roster.is_empty() => roster,
            _ => match guild_id.members(&ctx.http, None, None::<UserId>).await {
                Ok(members) => members.iter().map(member_entry).collect(),
                Err(e) => {
                    warn!(guild_id = %guild_id, error = %e, "failed to fetch guild members");
                    Vec::new()
                }
            },
        }
    }
}

pub(crate) fn roster_member(id: u64, username: &str, display_name: Option<&str>) -> RosterMember {
    RosterMember {
        id: id.to_string(),
        username: username.to_string(),
        display_name: display_name.map(str::to_string),
    }
}

fn member_entry(member: &Member) -> RosterMember {
    let display = member.nick.as_deref().or(member.user.global_name.as_deref());
    roster_member(member.user.id.get(), &member.user.name, display)
}

fn user_entry(user: &User) -> RosterMember {
    roster_member(user.id.get(), &user.name, user.global_name.as_deref())
}

/// Concatenate roster sources, keeping the first entry seen for each id.
pub(crate) fn merge_rosters(sources: impl IntoIterator<Item = RosterMember>) -> Vec<RosterMember> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|member| seen.insert(member.id.clone()))
        .collect()
}

pub(crate) fn to_inbound_event(msg: &Message, roster: Vec<RosterMember>) -> InboundEvent {
    InboundEvent {
        event_id: EventId(msg.id.to_string()),
        channel_id: ChannelId(msg.channel_id.to_string()),
        author_id: msg.author.id.to_string(),
        author_is_bot: msg.author.bot,
        text: msg.content.clone(),
        roster,
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let guild_members = match msg.guild_id {
            Some(guild_id) if self.fetch_roster => self.guild_roster(&ctx, guild_id).await,
            _ => Vec::new(),
        };
        let roster = merge_rosters(
            guild_members
                .into_iter()
                .chain(msg.mentions.iter().map(user_entry))
                .chain(std::iter::once(user_entry(&msg.author))),
        );

        debug!(
            channel_id = %msg.channel_id,
            message_id = %msg.id,
            roster = roster.len(),
            "message received"
        );

        let event = to_inbound_event(&msg, roster);
        let sink = Arc::new(DiscordSink::new(Arc::clone(&ctx.http)));
        self.relay.dispatch(event, sink);
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord gateway ready"
        );
    }
}
