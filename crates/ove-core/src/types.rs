// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Ove relay.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Leading marker on every user-visible failure notice.
pub const FAILURE_MARKER: &str = "⚠️";

/// Maximum length of a backend error snippet shown to users.
pub const FAULT_SNIPPET_LEN: usize = 120;

/// Identifier of a chat channel (one conversation record per channel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        ChannelId(value.to_string())
    }
}

/// Identifier of a platform event, used for duplicate-delivery suppression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        EventId(value.to_string())
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Backend,
    Storage,
}

// --- Conversation types ---

/// Speaker of a history entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in a channel's conversation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// The persisted form of a conversation record: `{"messages": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDocument {
    #[serde(default)]
    pub messages: Vec<HistoryEntry>,
}

// --- Channel types ---

/// A member of the guild roster, used for mention resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMember {
    /// Platform user id (rendered as `<@id>` in mentions).
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
}

/// A message-received event delivered by a chat platform.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub event_id: EventId,
    pub channel_id: ChannelId,
    pub author_id: String,
    pub author_is_bot: bool,
    pub text: String,
    pub roster: Vec<RosterMember>,
}

// --- Inference types ---

/// Sampling parameters sent with every job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub max_context_length: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.95,
            max_tokens: 120,
            max_context_length: 2048,
        }
    }
}

/// One generation request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// The trimmed user prompt.
    pub prompt: String,
    /// Bounded context window, oldest first. Does not include `prompt`.
    pub history: Vec<HistoryEntry>,
    /// Requested model, or `None` to let the backend choose.
    pub model: Option<String>,
    pub params: GenerationParams,
}

/// Observed state of a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    /// Generated texts in backend order; the first one is used.
    Done { generations: Vec<String> },
    Faulted { error: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// Result of submitting a job to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Accepted by an async job API; poll `id` for completion.
    Queued {
        id: String,
        eta: Option<Duration>,
    },
    /// A synchronous API answered inline.
    Finished(JobStatus),
}

/// A model the client may try, with live capacity signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub identifier: String,
    /// Number of workers currently serving this model.
    pub workers: u32,
    pub queue_depth: u64,
    pub estimated_wait_secs: u64,
}

// --- Reply types ---

/// Why an inference request produced no generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The prompt was empty after trimming.
    EmptyPrompt,
    /// The job finished without any generation.
    NoOutput,
    /// The backend reported the job as faulted.
    BackendFault(String),
    /// The deadline passed while the job was still pending.
    Timeout(Duration),
    /// No candidate accepted the job.
    Overloaded,
    /// The request was abandoned during shutdown.
    Cancelled,
}

/// Whole seconds rounded up, or milliseconds below one second.
struct BudgetDisplay(Duration);

impl fmt::Display for BudgetDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let budget = self.0;
        if budget < Duration::from_secs(1) {
            return write!(f, "{} ms", budget.as_millis());
        }
        let secs = budget.as_secs() + u64::from(budget.subsec_nanos() > 0);
        write!(f, "{secs} s")
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::EmptyPrompt => write!(f, "{FAILURE_MARKER} I need some text to reply to 🙂"),
            Failure::NoOutput => write!(f, "{FAILURE_MARKER} No reply was generated."),
            Failure::BackendFault(error) => write!(
                f,
                "{FAILURE_MARKER} The backend aborted the job: {}",
                truncate_chars(error, FAULT_SNIPPET_LEN)
            ),
            Failure::Timeout(budget) => write!(
                f,
                "{FAILURE_MARKER} The backend took too long (>{}). Try again later.",
                BudgetDisplay(*budget)
            ),
            Failure::Overloaded => write!(
                f,
                "{FAILURE_MARKER} The backend is overloaded right now, please retry later."
            ),
            Failure::Cancelled => write!(f, "{FAILURE_MARKER} The request was cancelled."),
        }
    }
}

/// Structured outcome of one inference request.
///
/// The user-facing string is produced by `Display` at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Generated(String),
    Failed(Failure),
}

impl Reply {
    pub fn is_generated(&self) -> bool {
        matches!(self, Reply::Generated(_))
    }

    /// The generated text, if any.
    pub fn generated(&self) -> Option<&str> {
        match self {
            Reply::Generated(text) => Some(text),
            Reply::Failed(_) => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Generated(text) => f.write_str(text),
            Reply::Failed(failure) => failure.fmt(f),
        }
    }
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
