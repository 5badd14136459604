// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent store for per-channel history documents.

use async_trait::async_trait;

use crate::error::OveError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelId, HistoryDocument};

/// Whole-document store keyed by channel id.
///
/// No partial update primitive is assumed: callers read the full document,
/// modify it, and write it back.
#[async_trait]
pub trait HistoryStore: PluginAdapter {
    /// Loads the document for a channel, `None` if it was never written.
    async fn load(&self, channel: &ChannelId) -> Result<Option<HistoryDocument>, OveError>;

    /// Replaces the document for a channel.
    async fn save(&self, channel: &ChannelId, document: &HistoryDocument) -> Result<(), OveError>;

    /// Deletes the document for a channel. Deleting a missing document is not an error.
    async fn delete(&self, channel: &ChannelId) -> Result<(), OveError>;
}
