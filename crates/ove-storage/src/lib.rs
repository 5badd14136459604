// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation history persistence for the Ove relay.
//!
//! Provides a WAL-mode SQLite [`HistoryStore`] with a single-writer
//! concurrency model via `tokio-rusqlite`, and an in-memory store for
//! ephemeral deployments and tests.

pub mod database;
pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use ove_config::model::{HistoryBackend, HistoryConfig};
use ove_core::error::OveError;
use ove_core::traits::HistoryStore;
use tracing::info;

pub use database::Database;
pub use memory::MemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

/// Open the history store selected by `history.backend`.
pub async fn open_history_store(config: &HistoryConfig) -> Result<Arc<dyn HistoryStore>, OveError> {
    match config.backend {
        HistoryBackend::Sqlite => {
            let store = SqliteHistoryStore::open(&config.database_path).await?;
            info!(path = %config.database_path, "SQLite history store opened");
            Ok(Arc::new(store))
        }
        HistoryBackend::Memory => {
            info!("in-memory history store selected");
            Ok(Arc::new(MemoryHistoryStore::new()))
        }
    }
}
