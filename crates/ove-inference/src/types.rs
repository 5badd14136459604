// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Horde async job API and the chat-completions API.

use ove_core::types::{JobStatus, ModelCandidate};
use serde::{Deserialize, Serialize};

// --- Horde ---

/// Body of `POST /generate/text/async`.
#[derive(Debug, Clone, Serialize)]
pub struct HordeRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
    pub params: HordeParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct HordeParams {
    pub max_length: u32,
    pub max_context_length: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Response to a job submission. A missing `id` means no job was created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HordeSubmitResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub kudos: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Nested `state` object used by some Horde-compatible deployments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HordeState {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A generation is either a bare string or an object carrying `text`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HordeGeneration {
    Text(String),
    Object { text: String },
}

impl HordeGeneration {
    pub fn into_text(self) -> String {
        match self {
            HordeGeneration::Text(text) | HordeGeneration::Object { text } => text,
        }
    }
}

/// Response to `GET /generate/text/status/{id}`.
///
/// Accepts three shapes: Horde's native `{done, faulted, wait_time, ...}`,
/// the flat `{status, error}` and the nested `{state: {status, error}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HordeStatusResponse {
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub faulted: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<HordeState>,
    #[serde(default)]
    pub generations: Vec<HordeGeneration>,
    #[serde(default)]
    pub wait_time: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HordeStatusResponse {
    fn status_word(&self) -> Option<&str> {
        self.state
            .as_ref()
            .and_then(|s| s.status.as_deref())
            .or(self.status.as_deref())
    }

    pub fn into_job_status(self) -> JobStatus {
        let word = self.status_word().map(str::to_ascii_lowercase);
        let faulted = self.faulted == Some(true) || word.as_deref() == Some("faulted");
        let done = self.done == Some(true) || word.as_deref() == Some("done");

        if faulted {
            let error = self
                .state
                .and_then(|s| s.error)
                .or(self.error)
                .or(self.message)
                .unwrap_or_else(|| "unknown error".to_string());
            JobStatus::Faulted { error }
        } else if done {
            JobStatus::Done {
                generations: self
                    .generations
                    .into_iter()
                    .map(HordeGeneration::into_text)
                    .collect(),
            }
        } else {
            JobStatus::Pending
        }
    }
}

/// One entry of `GET /status/models?type=text`.
#[derive(Debug, Clone, Deserialize)]
pub struct HordeModel {
    pub name: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub jobs: f64,
    #[serde(default)]
    pub queued: f64,
    #[serde(default)]
    pub eta: f64,
}

impl From<HordeModel> for ModelCandidate {
    fn from(model: HordeModel) -> Self {
        ModelCandidate {
            identifier: model.name,
            workers: model.count,
            queue_depth: model.jobs.max(0.0).round() as u64,
            estimated_wait_secs: model.eta.max(0.0).round() as u64,
        }
    }
}

/// Horde error body, e.g. `{"message": "Invalid API key"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct HordeErrorResponse {
    pub message: String,
}

// --- Chat completions ---

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatErrorResponse {
    pub error: ChatErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatErrorDetail {
    pub message: String,
}
