// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Ove chat relay.
//!
//! This crate provides the error type, the shared domain types, and the
//! adapter traits implemented by the inference backends, history stores,
//! and chat platform sinks.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::OveError;
pub use types::{
    AdapterType, ChannelId, EventId, Failure, HealthStatus, HistoryDocument, HistoryEntry,
    InboundEvent, Job, JobStatus, ModelCandidate, Reply, Role, RosterMember, Submission,
};

pub use traits::{ChannelSink, HistoryStore, InferenceBackend, PluginAdapter, TypingGuard};
