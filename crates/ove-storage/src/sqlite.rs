// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`HistoryStore`] trait.
//!
//! One row per channel; the whole history document is stored as JSON.

use async_trait::async_trait;
use ove_core::error::OveError;
use ove_core::traits::{HistoryStore, PluginAdapter};
use ove_core::types::{AdapterType, ChannelId, HealthStatus, HistoryDocument};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::database::{map_tr_err, Database};

pub struct SqliteHistoryStore {
    db: Database,
}

impl SqliteHistoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database at `path` and wrap it.
    pub async fn open(path: &str) -> Result<Self, OveError> {
        Ok(Self::new(Database::open(path).await?))
    }
}

#[async_trait]
impl PluginAdapter for SqliteHistoryStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, OveError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OveError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("shutdown: WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn load(&self, channel: &ChannelId) -> Result<Option<HistoryDocument>, OveError> {
        let channel_id = channel.0.clone();
        let raw: Option<String> = self
            .db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT document FROM conversations WHERE channel_id = ?1",
                    params![channel_id],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| OveError::Storage {
                source: Box::new(e),
            })
        })
        .transpose()
    }

    async fn save(&self, channel: &ChannelId, document: &HistoryDocument) -> Result<(), OveError> {
        let json = serde_json::to_string(document).map_err(|e| OveError::Storage {
            source: Box::new(e),
        })?;
        let channel_id = channel.0.clone();
        let updated_at = chrono::Utc::now().to_rfc3339();

        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO conversations (channel_id, document, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(channel_id) DO UPDATE SET
                         document = excluded.document,
                         updated_at = excluded.updated_at",
                    params![channel_id, json, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, channel: &ChannelId) -> Result<(), OveError> {
        let channel_id = channel.0.clone();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM conversations WHERE channel_id = ?1",
                    params![channel_id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ove_core::types::HistoryEntry;

    async fn temp_store() -> (tempfile::TempDir, SqliteHistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        let store = SqliteHistoryStore::open(path.to_str().unwrap()).await.unwrap();
        (dir, store)
    }

    fn doc(entries: &[HistoryEntry]) -> HistoryDocument {
        HistoryDocument {
            messages: entries.to_vec(),
        }
    }

    #[tokio::test]
    async fn missing_channel_loads_none() {
        let (_dir, store) = temp_store().await;
        assert!(store.load(&ChannelId::from("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_load_delete_per_channel() {
        let (_dir, store) = temp_store().await;
        let a = ChannelId::from("a");
        let b = ChannelId::from("b");

        store
            .save(&a, &doc(&[HistoryEntry::user("hi"), HistoryEntry::assistant("yo")]))
            .await
            .unwrap();
        store.save(&b, &doc(&[HistoryEntry::user("other")])).await.unwrap();

        let loaded = store.load(&a).await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[1], HistoryEntry::assistant("yo"));

        store.delete(&a).await.unwrap();
        assert!(store.load(&a).await.unwrap().is_none());
        assert_eq!(store.load(&b).await.unwrap().unwrap().messages.len(), 1);
    }

    #[tokio::test]
    async fn save_overwrites_document() {
        let (_dir, store) = temp_store().await;
        let a = ChannelId::from("a");

        store.save(&a, &doc(&[HistoryEntry::user("first")])).await.unwrap();
        store.save(&a, &doc(&[HistoryEntry::user("second")])).await.unwrap();

        let loaded = store.load(&a).await.unwrap().unwrap();
        assert_eq!(loaded.messages, vec![HistoryEntry::user("second")]);
    }

    #[tokio::test]
    async fn history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        let path = path.to_str().unwrap();
        let a = ChannelId::from("a");

        {
            let store = SqliteHistoryStore::open(path).await.unwrap();
            store.save(&a, &doc(&[HistoryEntry::user("kept")])).await.unwrap();
            store.shutdown().await.unwrap();
        }

        let store = SqliteHistoryStore::open(path).await.unwrap();
        let loaded = store.load(&a).await.unwrap().unwrap();
        assert_eq!(loaded.messages, vec![HistoryEntry::user("kept")]);
    }

    #[tokio::test]
    async fn corrupt_document_is_a_storage_error() {
        let (_dir, store) = temp_store().await;
        store
            .db
            .connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO conversations (channel_id, document, updated_at) VALUES ('x', 'not json', '')",
                    [],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
            .unwrap();

        let err = store.load(&ChannelId::from("x")).await.unwrap_err();
        assert!(matches!(err, OveError::Storage { .. }));
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let (_dir, store) = temp_store().await;
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
