// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference for the Ove relay.
//!
//! Contains the two [`InferenceBackend`] implementations ([`HordeBackend`] for
//! the AI Horde async job queue and [`ChatCompletionsBackend`] for
//! OpenAI-compatible endpoints), the [`ModelSelector`], the deadline-bounded
//! poll routine, and the [`InferenceClient`] that ties them together.

pub mod horde;
pub mod infer;
pub mod openai;
pub mod poll;
pub mod selector;
pub mod types;

use std::sync::Arc;

use ove_config::model::{BackendKind, OveConfig};
use ove_core::error::OveError;
use ove_core::traits::InferenceBackend;

pub use horde::HordeBackend;
pub use infer::InferenceClient;
pub use openai::ChatCompletionsBackend;
pub use poll::{poll_until, PollOutcome, PollPolicy};
pub use selector::ModelSelector;

/// Build the backend selected by `backend.kind`.
pub fn build_backend(config: &OveConfig) -> Result<Arc<dyn InferenceBackend>, OveError> {
    Ok(match config.backend.kind {
        BackendKind::Horde => Arc::new(HordeBackend::new(config)?),
        BackendKind::ChatCompletions => Arc::new(ChatCompletionsBackend::new(config)?),
    })
}

/// Returns true for HTTP status codes that indicate transient errors.
pub(crate) fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

pub(crate) fn request_error(e: reqwest::Error) -> OveError {
    OveError::Backend {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

pub(crate) fn http_error(status: reqwest::StatusCode, detail: &str) -> OveError {
    let kind = if is_transient_error(status) {
        "transient"
    } else {
        "rejected"
    };
    OveError::backend(format!("API returned {status} ({kind}): {}", detail.trim()))
}
