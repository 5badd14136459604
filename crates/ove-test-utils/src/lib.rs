// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Ove integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without Discord or a live backend.
//!
//! # Components
//!
//! - [`MockBackend`] - Inference backend with scripted job outcomes
//! - [`RecordingSink`] - Channel sink capturing sent messages and typing scopes
//! - [`FailingHistoryStore`] - History store whose every call errors
//! - [`TestHarness`] - Relay wired to the mocks above

pub mod failing_store;
pub mod harness;
pub mod mock_backend;
pub mod recording_sink;

pub use failing_store::FailingHistoryStore;
pub use harness::{TestHarness, TestHarnessBuilder, TEST_CHANNEL};
pub use mock_backend::{MockBackend, MockOutcome, DEFAULT_MOCK_REPLY};
pub use recording_sink::{RecordingSink, SentMessage};
