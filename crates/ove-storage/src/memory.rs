// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process [`HistoryStore`]; history is lost on restart.

use async_trait::async_trait;
use dashmap::DashMap;
use ove_core::error::OveError;
use ove_core::traits::{HistoryStore, PluginAdapter};
use ove_core::types::{AdapterType, ChannelId, HealthStatus, HistoryDocument};

#[derive(Default)]
pub struct MemoryHistoryStore {
    documents: DashMap<ChannelId, HistoryDocument>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl PluginAdapter for MemoryHistoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, OveError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OveError> {
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self, channel: &ChannelId) -> Result<Option<HistoryDocument>, OveError> {
        Ok(self.documents.get(channel).map(|doc| doc.clone()))
    }

    async fn save(&self, channel: &ChannelId, document: &HistoryDocument) -> Result<(), OveError> {
        self.documents.insert(channel.clone(), document.clone());
        Ok(())
    }

    async fn delete(&self, channel: &ChannelId) -> Result<(), OveError> {
        self.documents.remove(channel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ove_core::types::HistoryEntry;

    #[tokio::test]
    async fn round_trip_and_delete() {
        let store = MemoryHistoryStore::new();
        let channel = ChannelId::from("c");
        let document = HistoryDocument {
            messages: vec![HistoryEntry::user("hello")],
        };

        assert!(store.load(&channel).await.unwrap().is_none());
        store.save(&channel, &document).await.unwrap();
        assert_eq!(store.load(&channel).await.unwrap(), Some(document));
        assert_eq!(store.len(), 1);

        store.delete(&channel).await.unwrap();
        assert!(store.is_empty());
    }
}
