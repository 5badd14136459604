// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock inference backend for deterministic testing.
//!
//! `MockBackend` implements `InferenceBackend` with a queue of scripted
//! outcomes. Each submission takes the next outcome; the matching job then
//! reports it on its first status read.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use ove_core::error::OveError;
use ove_core::traits::{InferenceBackend, PluginAdapter};
use ove_core::types::{AdapterType, HealthStatus, Job, JobStatus, ModelCandidate, Submission};

/// Reply text used when the script runs out.
pub const DEFAULT_MOCK_REPLY: &str = "mock reply";

/// One scripted result for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    /// The job finishes with this text.
    Reply(String),
    /// The job faults with this error.
    Fault(String),
    /// The submission itself fails.
    SubmitError(String),
    /// The job never leaves the queue.
    Pending,
}

pub struct MockBackend {
    script: Mutex<VecDeque<MockOutcome>>,
    jobs: Mutex<HashMap<String, MockOutcome>>,
    submitted: Mutex<Vec<Job>>,
    capacity: Mutex<Result<Vec<ModelCandidate>, String>>,
    status_calls: AtomicUsize,
    cancelled: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            jobs: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            capacity: Mutex::new(Ok(Vec::new())),
            status_calls: AtomicUsize::new(0),
            cancelled: Mutex::new(Vec::new()),
        }
    }

    pub fn with_outcomes(outcomes: Vec<MockOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            ..Self::new()
        }
    }

    /// Replace what `capacity` reports; `Err` makes the query fail.
    pub async fn set_capacity(&self, capacity: Result<Vec<ModelCandidate>, String>) {
        *self.capacity.lock().await = capacity;
    }

    /// Every job passed to `submit`, in order.
    pub async fn submitted_jobs(&self) -> Vec<Job> {
        self.submitted.lock().await.clone()
    }

    pub async fn submit_count(&self) -> usize {
        self.submitted.lock().await.len()
    }

    pub fn status_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Ids passed to `cancel`, in order.
    pub async fn cancelled_jobs(&self) -> Vec<String> {
        self.cancelled.lock().await.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
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
impl InferenceBackend for MockBackend {
    async fn submit(&self, job: &Job) -> Result<Submission, OveError> {
        let number = {
            let mut submitted = self.submitted.lock().await;
            submitted.push(job.clone());
            submitted.len()
        };

        let outcome = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Reply(DEFAULT_MOCK_REPLY.to_string()));

        if let MockOutcome::SubmitError(message) = outcome {
            return Err(OveError::backend(message));
        }

        let id = format!("mock-job-{number}");
        self.jobs.lock().await.insert(id.clone(), outcome);
        Ok(Submission::Queued { id, eta: None })
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, OveError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let jobs = self.jobs.lock().await;
        match jobs.get(job_id) {
            Some(MockOutcome::Reply(text)) => Ok(JobStatus::Done {
                generations: vec![text.clone()],
            }),
            Some(MockOutcome::Fault(error)) => Ok(JobStatus::Faulted {
                error: error.clone(),
            }),
            Some(MockOutcome::Pending) => Ok(JobStatus::Pending),
            Some(MockOutcome::SubmitError(_)) | None => {
                Err(OveError::backend(format!("unknown job `{job_id}`")))
            }
        }
    }

    async fn capacity(&self) -> Result<Vec<ModelCandidate>, OveError> {
        self.capacity.lock().await.clone().map_err(OveError::backend)
    }

    async fn cancel(&self, job_id: &str) -> Result<(), OveError> {
        self.cancelled.lock().await.push(job_id.to_string());
        self.jobs.lock().await.remove(job_id);
        Ok(())
    }
}
