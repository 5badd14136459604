// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI Horde async text-generation backend.
//!
//! Jobs are submitted to `/generate/text/async` and observed through
//! `/generate/text/status/{id}`. Live per-model capacity comes from
//! `/status/models?type=text`.

use std::time::Duration;

use async_trait::async_trait;
use ove_config::model::OveConfig;
use ove_core::error::OveError;
use ove_core::traits::{InferenceBackend, PluginAdapter};
use ove_core::types::{
    AdapterType, HealthStatus, Job, JobStatus, ModelCandidate, Role, Submission,
};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::types::{
    HordeErrorResponse, HordeModel, HordeParams, HordeRequest, HordeStatusResponse,
    HordeSubmitResponse,
};
use crate::{http_error, is_transient_error, request_error};

/// Key the Horde accepts for anonymous, lowest-priority requests.
pub const ANONYMOUS_API_KEY: &str = "0000000000";

/// Backend for the AI Horde distributed job queue.
#[derive(Debug, Clone)]
pub struct HordeBackend {
    client: reqwest::Client,
    base_url: String,
    persona: String,
}

impl HordeBackend {
    /// Builds a backend from `[backend]` and the bot name used as the persona.
    pub fn new(config: &OveConfig) -> Result<Self, OveError> {
        let api_key = config
            .backend
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|k| SecretString::from(k.to_string()))
            .unwrap_or_else(|| SecretString::from(ANONYMOUS_API_KEY.to_string()));

        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|e| OveError::Config(format!("invalid API key header value: {e}")))?;
        key_value.set_sensitive(true);
        headers.insert("apikey", key_value);
        headers.insert(
            "Client-Agent",
            HeaderValue::from_str(&config.backend.client_agent)
                .map_err(|e| OveError::Config(format!("invalid client agent header value: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.backend.request_timeout())
            .build()
            .map_err(|e| OveError::Backend {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(base_url = %config.backend.base_url, "Horde backend initialized");

        Ok(Self {
            client,
            base_url: config.backend.base_url.trim_end_matches('/').to_string(),
            persona: config.bot.name.clone(),
        })
    }

    /// Renders the bounded history and prompt into a single transcript.
    ///
    /// Without history the prompt is sent unchanged.
    pub fn render_prompt(&self, job: &Job) -> String {
        if job.history.is_empty() {
            return job.prompt.clone();
        }

        let mut transcript = String::new();
        for entry in &job.history {
            let speaker = match entry.role {
                Role::User => "User",
                Role::Assistant => self.persona.as_str(),
            };
            transcript.push_str(speaker);
            transcript.push_str(": ");
            transcript.push_str(entry.content.trim());
            transcript.push('\n');
        }
        transcript.push_str("User: ");
        transcript.push_str(&job.prompt);
        transcript.push('\n');
        transcript.push_str(&self.persona);
        transcript.push(':');
        transcript
    }

    fn to_request(&self, job: &Job) -> HordeRequest {
        HordeRequest {
            prompt: self.render_prompt(job),
            models: job.model.clone().map(|m| vec![m]),
            params: HordeParams {
                max_length: job.params.max_tokens,
                max_context_length: job.params.max_context_length,
                temperature: job.params.temperature,
                top_p: job.params.top_p,
            },
        }
    }

    async fn read_status(&self, job_id: &str) -> Result<HordeStatusResponse, OveError> {
        let response = self
            .client
            .get(format!("{}/generate/text/status/{job_id}", self.base_url))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(horde_error(status, &body));
        }

        response.json().await.map_err(|e| OveError::Backend {
            message: format!("failed to parse job status: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

/// Prefers the Horde's `message` field over the raw body.
fn horde_error(status: reqwest::StatusCode, body: &str) -> OveError {
    match serde_json::from_str::<HordeErrorResponse>(body) {
        Ok(err) => http_error(status, &err.message),
        Err(_) => http_error(status, body),
    }
}

#[async_trait]
impl PluginAdapter for HordeBackend {
    fn name(&self) -> &str {
        "horde"
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
impl InferenceBackend for HordeBackend {
    async fn submit(&self, job: &Job) -> Result<Submission, OveError> {
        let request = self.to_request(job);
        let response = self
            .client
            .post(format!("{}/generate/text/async", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, transient = is_transient_error(status), "submission rejected");
            return Err(horde_error(status, &body));
        }

        let accepted: HordeSubmitResponse = response.json().await.map_err(|e| OveError::Backend {
            message: format!("failed to parse submission response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let Some(id) = accepted.id.filter(|id| !id.trim().is_empty()) else {
            return Err(OveError::backend(format!(
                "submission accepted without a job id{}",
                accepted
                    .message
                    .map(|m| format!(": {m}"))
                    .unwrap_or_default()
            )));
        };

        // The submit response carries no wait estimate; one status read does.
        let eta = match self.read_status(&id).await {
            Ok(first) => first.wait_time.map(Duration::from_secs),
            Err(e) => {
                debug!(job_id = %id, error = %e, "initial status read failed");
                None
            }
        };

        debug!(job_id = %id, kudos = ?accepted.kudos, eta = ?eta, "job queued");
        Ok(Submission::Queued { id, eta })
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, OveError> {
        Ok(self.read_status(job_id).await?.into_job_status())
    }

    async fn capacity(&self) -> Result<Vec<ModelCandidate>, OveError> {
        let response = self
            .client
            .get(format!("{}/status/models?type=text", self.base_url))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(horde_error(status, &body));
        }

        let models: Vec<HordeModel> = response.json().await.map_err(|e| OveError::Backend {
            message: format!("failed to parse model list: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(models.into_iter().map(ModelCandidate::from).collect())
    }

    async fn cancel(&self, job_id: &str) -> Result<(), OveError> {
        let response = self
            .client
            .delete(format!("{}/generate/text/status/{job_id}", self.base_url))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(horde_error(status, &body));
        }
        debug!(job_id, "job cancelled");
        Ok(())
    }
}
