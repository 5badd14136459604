// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Ove relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use ove_core::types::GenerationParams;
use serde::{Deserialize, Serialize};

/// Top-level Ove configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OveConfig {
    /// Bot identity and activation behavior.
    #[serde(default)]
    pub bot: BotConfig,

    /// Discord connection settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Inference backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Sampling parameters sent with every job.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Conversation history settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Liveness endpoint settings.
    #[serde(default)]
    pub health: HealthConfig,
}

/// Bot identity and activation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in logs and transcript prompts.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Messages starting with this prefix are commands, never prompts.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Keyword that activates relaying in a channel. Empty means always active.
    #[serde(default = "default_trigger_word")]
    pub trigger_word: String,

    /// Show a typing indicator while waiting on the backend.
    #[serde(default = "default_true")]
    pub typing_indicator: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            command_prefix: default_command_prefix(),
            trigger_word: default_trigger_word(),
            typing_indicator: true,
        }
    }
}

fn default_bot_name() -> String {
    "ove".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_trigger_word() -> String {
    "ove".to_string()
}

fn default_true() -> bool {
    true
}

/// Discord connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Discord bot token. Required to serve.
    #[serde(default)]
    pub token: Option<String>,

    /// Fetch the guild member list for `@{name}` mention resolution.
    /// Requires the privileged GUILD_MEMBERS intent.
    #[serde(default = "default_true")]
    pub fetch_roster: bool,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            fetch_roster: true,
        }
    }
}

/// Which wire protocol the backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// AI Horde style async job API (submit, then poll).
    #[default]
    Horde,
    /// OpenAI-compatible synchronous `/chat/completions`.
    ChatCompletions,
}

/// Inference backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// API root, e.g. `https://aihorde.net/api/v2`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. The Horde accepts anonymous requests when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Value of the `Client-Agent` header sent to the Horde.
    #[serde(default = "default_client_agent")]
    pub client_agent: String,

    /// Static model list, used when live capacity is unavailable.
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Only consider live models that also appear in `models`.
    #[serde(default = "default_true")]
    pub restrict_to_listed: bool,

    /// Upper bound on candidates tried per request.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Overall budget for one reply, submission through completion.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Interval between status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay before retrying a failed status poll.
    #[serde(default = "default_poll_retry_ms")]
    pub poll_retry_ms: u64,

    /// Per-HTTP-request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            base_url: default_base_url(),
            api_key: None,
            client_agent: default_client_agent(),
            models: default_models(),
            restrict_to_listed: true,
            max_candidates: default_max_candidates(),
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_retry_ms: default_poll_retry_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_retry(&self) -> Duration {
        Duration::from_millis(self.poll_retry_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://aihorde.net/api/v2".to_string()
}

fn default_client_agent() -> String {
    concat!("ove:", env!("CARGO_PKG_VERSION"), ":https://github.com/ove-relay/ove").to_string()
}

fn default_models() -> Vec<String> {
    vec!["Pygmalion-2-7b".to_string()]
}

fn default_max_candidates() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_retry_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Sampling parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Context window requested from the worker.
    #[serde(default = "default_max_context_length")]
    pub max_context_length: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            max_context_length: default_max_context_length(),
        }
    }
}

impl GenerationConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            max_context_length: self.max_context_length,
        }
    }
}

fn default_temperature() -> f32 {
    0.8
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_tokens() -> u32 {
    120
}

fn default_max_context_length() -> u32 {
    2048
}

/// Where conversation history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Conversation history configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Send recent history as model context. When disabled only the prompt is sent.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum stored entries per channel. Half of this is sent as context.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default)]
    pub backend: HistoryBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
            backend: HistoryBackend::default(),
            database_path: default_database_path(),
        }
    }
}

fn default_max_entries() -> usize {
    20
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("ove").join("ove.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "ove.db".to_string())
}

/// Liveness endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_health_bind")]
    pub bind_address: String,

    #[serde(default = "default_health_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_health_bind(),
            port: default_health_port(),
        }
    }
}

fn default_health_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_health_port() -> u16 {
    8080
}
