// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded per-channel conversation history.
//!
//! Each append is a whole-document read-modify-write against the
//! [`HistoryStore`]. Concurrent appends to the same channel are not
//! serialized and one of them may be lost; the length bound always holds.
//!
//! Every write is mirrored in process. When the store fails the error is
//! logged and the mirror answers reads for that channel instead.

use std::sync::Arc;

use dashmap::DashMap;
use ove_core::traits::HistoryStore;
use ove_core::types::{ChannelId, HistoryDocument, HistoryEntry, Role};
use tracing::{debug, warn};

pub struct ConversationStore {
    store: Option<Arc<dyn HistoryStore>>,
    mirror: DashMap<ChannelId, Vec<HistoryEntry>>,
    max_entries: usize,
}

impl ConversationStore {
    pub fn new(store: Arc<dyn HistoryStore>, max_entries: usize) -> Self {
        Self {
            store: Some(store),
            mirror: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// A store that keeps nothing; every read is empty.
    pub fn disabled() -> Self {
        Self {
            store: None,
            mirror: DashMap::new(),
            max_entries: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Full history for a channel, oldest first.
    pub async fn get(&self, channel: &ChannelId) -> Vec<HistoryEntry> {
        let Some(store) = &self.store else {
            return Vec::new();
        };

        match store.load(channel).await {
            Ok(document) => {
                let messages = document.map(|d| d.messages).unwrap_or_default();
                self.mirror.insert(channel.clone(), messages.clone());
                messages
            }
            Err(e) => {
                warn!(channel_id = %channel, error = %e, "history load failed, using in-process copy");
                self.mirror
                    .get(channel)
                    .map(|m| m.clone())
                    .unwrap_or_default()
            }
        }
    }

    /// The last `k` entries, oldest first.
    pub async fn recent(&self, channel: &ChannelId, k: usize) -> Vec<HistoryEntry> {
        let mut messages = self.get(channel).await;
        let skip = messages.len().saturating_sub(k);
        messages.drain(..skip);
        messages
    }

    /// Append one turn. Returns false when nothing was stored because the
    /// newest entry already has the same role and content.
    pub async fn append(&self, channel: &ChannelId, role: Role, content: &str) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        let mut messages = self.get(channel).await;
        if messages
            .last()
            .is_some_and(|last| last.role == role && last.content == content)
        {
            debug!(channel_id = %channel, role = %role, "skipping repeated entry");
            return false;
        }

        messages.push(HistoryEntry::new(role, content));
        let overflow = messages.len().saturating_sub(self.max_entries);
        messages.drain(..overflow);

        self.mirror.insert(channel.clone(), messages.clone());
        let document = HistoryDocument { messages };
        if let Err(e) = store.save(channel, &document).await {
            warn!(channel_id = %channel, error = %e, "history save failed, kept in-process copy");
        }
        true
    }

    /// Forget the channel's history.
    pub async fn reset(&self, channel: &ChannelId) {
        self.mirror.remove(channel);
        if let Some(store) = &self.store
            && let Err(e) = store.delete(channel).await
        {
            warn!(channel_id = %channel, error = %e, "history delete failed");
        }
    }
}
