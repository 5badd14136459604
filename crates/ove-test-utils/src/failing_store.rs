// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A history store whose every operation fails.

use async_trait::async_trait;

use ove_core::error::OveError;
use ove_core::traits::{HistoryStore, PluginAdapter};
use ove_core::types::{AdapterType, ChannelId, HealthStatus, HistoryDocument};

#[derive(Debug, Clone, Copy, Default)]
pub struct FailingHistoryStore;

#[async_trait]
impl PluginAdapter for FailingHistoryStore {
    fn name(&self) -> &str {
        "failing-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, OveError> {
        Ok(HealthStatus::Unhealthy("always fails".into()))
    }

    async fn shutdown(&self) -> Result<(), OveError> {
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for FailingHistoryStore {
    async fn load(&self, _channel: &ChannelId) -> Result<Option<HistoryDocument>, OveError> {
        Err(OveError::storage("store unavailable"))
    }

    async fn save(&self, _channel: &ChannelId, _document: &HistoryDocument) -> Result<(), OveError> {
        Err(OveError::storage("store unavailable"))
    }

    async fn delete(&self, _channel: &ChannelId) -> Result<(), OveError> {
        Err(OveError::storage("store unavailable"))
    }
}
