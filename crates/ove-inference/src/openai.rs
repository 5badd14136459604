// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous backend for OpenAI-compatible chat-completions endpoints.

use async_trait::async_trait;
use ove_config::model::OveConfig;
use ove_core::error::OveError;
use ove_core::traits::{InferenceBackend, PluginAdapter};
use ove_core::types::{
    AdapterType, HealthStatus, Job, JobStatus, ModelCandidate, Submission,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::types::{ChatErrorResponse, ChatMessage, ChatRequest, ChatResponse};
use crate::{http_error, is_transient_error, request_error};

/// Chat-completions backend. Every submission finishes in one request.
#[derive(Debug, Clone)]
pub struct ChatCompletionsBackend {
    client: reqwest::Client,
    base_url: String,
    default_model: Option<String>,
}

impl ChatCompletionsBackend {
    pub fn new(config: &OveConfig) -> Result<Self, OveError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config
            .backend
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
        {
            let key = SecretString::from(key.to_string());
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
                .map_err(|e| OveError::Config(format!("invalid API key header value: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.backend.request_timeout())
            .build()
            .map_err(|e| OveError::Backend {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(base_url = %config.backend.base_url, "chat-completions backend initialized");

        Ok(Self {
            client,
            base_url: config.backend.base_url.trim_end_matches('/').to_string(),
            default_model: config.backend.models.first().cloned(),
        })
    }

    fn to_request(&self, job: &Job) -> ChatRequest {
        let mut messages: Vec<ChatMessage> = job
            .history
            .iter()
            .map(|entry| ChatMessage {
                role: entry.role.to_string(),
                content: entry.content.clone(),
            })
            .collect();
        messages.push(ChatMessage {
            role: "user".into(),
            content: job.prompt.clone(),
        });

        ChatRequest {
            model: job.model.clone().or_else(|| self.default_model.clone()),
            messages,
            max_tokens: job.params.max_tokens,
            temperature: job.params.temperature,
            top_p: job.params.top_p,
        }
    }
}

#[async_trait]
impl PluginAdapter for ChatCompletionsBackend {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, OveError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OveError> {
        Ok(())
    }
}

#[async_trait]
impl InferenceBackend for ChatCompletionsBackend {
    async fn submit(&self, job: &Job) -> Result<Submission, OveError> {
        let request = self.to_request(job);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, transient = is_transient_error(status), "completion rejected");
            return Err(match serde_json::from_str::<ChatErrorResponse>(&body) {
                Ok(err) => http_error(status, &err.error.message),
                Err(_) => http_error(status, &body),
            });
        }

        let completion: ChatResponse = response.json().await.map_err(|e| OveError::Backend {
            message: format!("failed to parse completion response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let generations = completion
            .choices
            .into_iter()
            .filter_map(|choice| choice.message.content)
            .collect();

        Ok(Submission::Finished(JobStatus::Done { generations }))
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, OveError> {
        Err(OveError::backend(format!(
            "chat-completions backend has no job `{job_id}` to poll"
        )))
    }

    async fn capacity(&self) -> Result<Vec<ModelCandidate>, OveError> {
        Ok(Vec::new())
    }

    async fn cancel(&self, _job_id: &str) -> Result<(), OveError> {
        Ok(())
    }
}
