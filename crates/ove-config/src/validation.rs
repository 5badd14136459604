// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as sampling ranges, non-zero durations, and required credentials.

use crate::diagnostic::ConfigError;
use crate::model::{BackendKind, HistoryBackend, OveConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or every collected error
/// (does not fail fast).
pub fn validate_config(config: &OveConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    let backend = &config.backend;
    if backend.base_url.trim().is_empty() {
        invalid("backend.base_url must not be empty".to_string());
    } else if !backend.base_url.starts_with("http://") && !backend.base_url.starts_with("https://")
    {
        invalid(format!(
            "backend.base_url `{}` must start with http:// or https://",
            backend.base_url
        ));
    }

    if backend.kind == BackendKind::Horde && backend.models.iter().all(|m| m.trim().is_empty()) {
        invalid("backend.models must list at least one fallback model".to_string());
    }

    if backend.kind == BackendKind::ChatCompletions && backend.models.is_empty() {
        invalid("backend.models must name the chat model to use".to_string());
    }

    if backend.max_candidates == 0 {
        invalid("backend.max_candidates must be at least 1".to_string());
    }

    if backend.timeout_secs == 0 {
        invalid("backend.timeout_secs must be greater than zero".to_string());
    }

    if backend.poll_interval_ms == 0 {
        invalid("backend.poll_interval_ms must be greater than zero".to_string());
    }

    if backend.request_timeout_secs == 0 {
        invalid("backend.request_timeout_secs must be greater than zero".to_string());
    }

    let generation = &config.generation;
    if !(0.0..=2.0).contains(&generation.temperature) {
        invalid(format!(
            "generation.temperature must be within 0.0..=2.0, got {}",
            generation.temperature
        ));
    }

    if !(generation.top_p > 0.0 && generation.top_p <= 1.0) {
        invalid(format!(
            "generation.top_p must be within (0.0, 1.0], got {}",
            generation.top_p
        ));
    }

    if generation.max_tokens == 0 {
        invalid("generation.max_tokens must be greater than zero".to_string());
    }

    if generation.max_context_length < generation.max_tokens {
        invalid(format!(
            "generation.max_context_length ({}) must not be smaller than generation.max_tokens ({})",
            generation.max_context_length, generation.max_tokens
        ));
    }

    if config.history.max_entries < 2 {
        invalid(format!(
            "history.max_entries must be at least 2, got {}",
            config.history.max_entries
        ));
    }

    if config.history.backend == HistoryBackend::Sqlite
        && config.history.database_path.trim().is_empty()
    {
        invalid("history.database_path must not be empty".to_string());
    }

    if config.bot.command_prefix.is_empty() {
        invalid("bot.command_prefix must not be empty".to_string());
    }

    if config.bot.trigger_word.split_whitespace().count() > 1 {
        invalid(format!(
            "bot.trigger_word must be a single word, got `{}`",
            config.bot.trigger_word
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check the credentials needed to serve. Missing ones are startup-fatal.
pub fn require_credentials(config: &OveConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let has_token = config
        .discord
        .token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_token {
        errors.push(ConfigError::MissingCredential {
            key: "discord.token".to_string(),
            env: "OVE_DISCORD_TOKEN".to_string(),
        });
    }

    let has_key = config
        .backend
        .api_key
        .as_deref()
        .is_some_and(|k| !k.trim().is_empty());
    if config.backend.kind == BackendKind::ChatCompletions && !has_key {
        errors.push(ConfigError::MissingCredential {
            key: "backend.api_key".to_string(),
            env: "OVE_BACKEND_API_KEY".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
