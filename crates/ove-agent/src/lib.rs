// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state and message relay for the Ove bot.
//!
//! The [`Relay`] is the central coordinator that:
//! - Drops bot-authored messages and answers `ping` / `reset` commands
//! - Deduplicates redelivered events and tracks per-channel activation
//! - Keeps a bounded rolling history per channel
//! - Sends the prompt and a history window to the [`InferenceClient`](ove_inference::InferenceClient)
//! - Resolves `@{name}` mentions and delivers the reply

pub mod activation;
pub mod conversation;
pub mod mention;
pub mod relay;
pub mod shutdown;

pub use activation::{ChannelActivation, ChannelState};
pub use conversation::ConversationStore;
pub use mention::MentionResolver;
pub use relay::{Handled, Relay, RelaySettings, PONG, RESET_NOTICE};
pub use shutdown::install_signal_handler;
