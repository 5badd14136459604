// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the collaborators around the relay core.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod backend;
pub mod channel;
pub mod storage;

pub use adapter::PluginAdapter;
pub use backend::InferenceBackend;
pub use channel::{ChannelSink, TypingGuard};
pub use storage::HistoryStore;
