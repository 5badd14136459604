// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submit-and-poll orchestration with timeout and model fallback.

use std::sync::Arc;
use std::time::Duration;

use ove_config::model::OveConfig;
use ove_core::traits::InferenceBackend;
use ove_core::types::{Failure, GenerationParams, HistoryEntry, Job, JobStatus, Reply, Submission};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::poll::{poll_until, PollOutcome, PollPolicy};
use crate::selector::ModelSelector;

/// Turns a prompt and bounded history into a [`Reply`].
///
/// Backend and network failures never escape as errors; each ends up as a
/// [`Failure`] variant.
#[derive(Clone)]
pub struct InferenceClient {
    backend: Arc<dyn InferenceBackend>,
    selector: ModelSelector,
    params: GenerationParams,
    timeout: Duration,
    poll_interval: Duration,
    poll_retry: Duration,
}

impl InferenceClient {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        selector: ModelSelector,
        params: GenerationParams,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            selector,
            params,
            timeout,
            poll_interval: Duration::from_secs(1),
            poll_retry: Duration::from_secs(2),
        }
    }

    pub fn from_config(backend: Arc<dyn InferenceBackend>, config: &OveConfig) -> Self {
        Self::new(
            backend,
            ModelSelector::from_config(&config.backend),
            config.generation.params(),
            config.backend.timeout(),
        )
        .with_poll_timing(config.backend.poll_interval(), config.backend.poll_retry())
    }

    pub fn with_poll_timing(mut self, interval: Duration, retry_backoff: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_retry = retry_backoff;
        self
    }

    /// Ask the selector for candidates, then run them against the configured timeout.
    ///
    /// The deadline starts here, so a slow capacity query eats into the same
    /// budget. If the query outlasts it, the static fallback list is used.
    pub async fn respond(
        &self,
        prompt: &str,
        history: &[HistoryEntry],
        cancel: &CancellationToken,
    ) -> Reply {
        if prompt.trim().is_empty() {
            return Reply::Failed(Failure::EmptyPrompt);
        }

        let deadline = Instant::now() + self.timeout;
        let selection = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Reply::Failed(Failure::Cancelled),
            ranked = tokio::time::timeout_at(deadline, self.selector.select_order(self.backend.as_ref())) => ranked,
        };
        let candidates = selection.unwrap_or_else(|_elapsed| {
            warn!("capacity query did not answer before the deadline, using fallback models");
            self.selector.fallback_order()
        });

        self.run(prompt, history, &candidates, self.timeout, deadline, cancel)
            .await
    }

    /// Try each candidate in order until one produces a job, then poll it.
    ///
    /// The deadline covers the whole call, submissions included.
    pub async fn infer(
        &self,
        prompt: &str,
        history: &[HistoryEntry],
        candidates: &[String],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Reply {
        let deadline = Instant::now() + timeout;
        self.run(prompt, history, candidates, timeout, deadline, cancel)
            .await
    }

    async fn run(
        &self,
        prompt: &str,
        history: &[HistoryEntry],
        candidates: &[String],
        timeout: Duration,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Reply {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Reply::Failed(Failure::EmptyPrompt);
        }

        let models: Vec<Option<String>> = if candidates.is_empty() {
            vec![None]
        } else {
            candidates.iter().cloned().map(Some).collect()
        };

        for (attempt, model) in models.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Reply::Failed(Failure::Cancelled);
            }
            if Instant::now() >= deadline {
                return Reply::Failed(Failure::Timeout(timeout));
            }

            let label = model.as_deref().unwrap_or("any").to_string();
            let job = Job {
                prompt: prompt.to_string(),
                history: history.to_vec(),
                model,
                params: self.params,
            };

            let submitted = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Reply::Failed(Failure::Cancelled),
                result = tokio::time::timeout_at(deadline, self.backend.submit(&job)) => result,
            };

            let submission = match submitted {
                Err(_elapsed) => return Reply::Failed(Failure::Timeout(timeout)),
                Ok(Err(e)) => {
                    warn!(model = %label, attempt, error = %e, "submission failed, trying next candidate");
                    continue;
                }
                Ok(Ok(submission)) => submission,
            };

            let (job_id, eta) = match submission {
                Submission::Finished(status) => return finish(status),
                Submission::Queued { id, eta } => (id, eta),
            };

            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Some(eta) = eta
                && eta > remaining
            {
                info!(
                    model = %label,
                    job_id = %job_id,
                    eta_secs = eta.as_secs(),
                    remaining_secs = remaining.as_secs(),
                    "estimated wait exceeds budget, skipping candidate"
                );
                self.abandon(&job_id).await;
                continue;
            }

            debug!(model = %label, job_id = %job_id, "polling job");
            let policy = PollPolicy {
                interval: self.poll_interval,
                retry_backoff: self.poll_retry,
                deadline,
            };
            let backend = &self.backend;
            let id = job_id.as_str();
            let outcome = poll_until(&policy, cancel, || async move {
                backend
                    .status(id)
                    .await
                    .map(|status| status.is_terminal().then_some(status))
            })
            .await;

            return match outcome {
                PollOutcome::Ready(status) => finish(status),
                PollOutcome::TimedOut => {
                    warn!(model = %label, job_id = %job_id, "job did not finish before the deadline");
                    self.abandon(&job_id).await;
                    Reply::Failed(Failure::Timeout(timeout))
                }
                PollOutcome::Cancelled => {
                    self.abandon(&job_id).await;
                    Reply::Failed(Failure::Cancelled)
                }
            };
        }

        warn!("every candidate model was exhausted");
        Reply::Failed(Failure::Overloaded)
    }

    /// Release a queued job that will not be polled again.
    async fn abandon(&self, job_id: &str) {
        if let Err(e) = self.backend.cancel(job_id).await {
            warn!(job_id, error = %e, "failed to cancel abandoned job");
        }
    }
}

/// Map a terminal status to a reply. Blank output counts as no output.
fn finish(status: JobStatus) -> Reply {
    match status {
        JobStatus::Done { generations } => match generations.first().map(|g| g.trim()) {
            Some(text) if !text.is_empty() => Reply::Generated(text.to_string()),
            _ => Reply::Failed(Failure::NoOutput),
        },
        JobStatus::Faulted { error } => Reply::Failed(Failure::BackendFault(error)),
        JobStatus::Pending => Reply::Failed(Failure::NoOutput),
    }
}
