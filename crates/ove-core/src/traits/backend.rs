// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference backend trait covering both async job APIs and synchronous
//! chat-completions APIs.

use async_trait::async_trait;

use crate::error::OveError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Job, JobStatus, ModelCandidate, Submission};

/// A remote text-generation backend.
///
/// Async job APIs return [`Submission::Queued`] from `submit` and are then
/// polled through `status`. Synchronous APIs return [`Submission::Finished`]
/// and never need `status`.
#[async_trait]
pub trait InferenceBackend: PluginAdapter {
    /// Submits a job. Any error here is a submission failure for the job's model.
    async fn submit(&self, job: &Job) -> Result<Submission, OveError>;

    /// Reads the current status of a queued job.
    async fn status(&self, job_id: &str) -> Result<JobStatus, OveError>;

    /// Reports live per-model capacity. Backends without such a signal return
    /// an empty list.
    async fn capacity(&self) -> Result<Vec<ModelCandidate>, OveError>;

    /// Abandons a queued job that will no longer be polled. Backends without
    /// server-side jobs return `Ok(())`.
    async fn cancel(&self, job_id: &str) -> Result<(), OveError>;
}
