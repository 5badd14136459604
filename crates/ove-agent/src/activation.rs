// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel trigger and duplicate-delivery state.
//!
//! A channel starts dormant and becomes active once a message contains the
//! trigger word. It stays active until an explicit reset.

use dashmap::DashMap;
use ove_core::error::OveError;
use ove_core::types::{ChannelId, EventId};
use regex::Regex;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelState {
    pub active: bool,
    pub last_event: Option<EventId>,
}

pub struct ChannelActivation {
    states: DashMap<ChannelId, ChannelState>,
    /// `None` means every channel is always active.
    trigger: Option<Regex>,
}

impl ChannelActivation {
    /// Build with a trigger word matched case-insensitively as a whole word.
    pub fn new(trigger_word: &str) -> Result<Self, OveError> {
        let word = trigger_word.trim();
        let trigger = if word.is_empty() {
            None
        } else {
            // `\b` never matches before a leading non-word char like `@`.
            let pattern = format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(word));
            Some(
                Regex::new(&pattern)
                    .map_err(|e| OveError::Config(format!("invalid trigger word `{word}`: {e}")))?,
            )
        };
        Ok(Self {
            states: DashMap::new(),
            trigger,
        })
    }

    /// Record `event` as processed. Returns false if it was already the
    /// channel's last processed event.
    ///
    /// The check and the update happen under the channel's entry lock.
    pub fn observe(&self, channel: &ChannelId, event: &EventId) -> bool {
        let mut state = self.states.entry(channel.clone()).or_default();
        if state.last_event.as_ref() == Some(event) {
            debug!(channel_id = %channel, event_id = %event, "duplicate event dropped");
            return false;
        }
        state.last_event = Some(event.clone());
        true
    }

    /// Activate the channel if `text` contains the trigger word; returns
    /// whether the channel is active afterwards.
    pub fn trigger(&self, channel: &ChannelId, text: &str) -> bool {
        let mut state = self.states.entry(channel.clone()).or_default();
        if !state.active {
            let fired = self.trigger.as_ref().is_none_or(|re| re.is_match(text));
            if fired {
                state.active = true;
                info!(channel_id = %channel, "channel activated");
            }
        }
        state.active
    }

    pub fn is_active(&self, channel: &ChannelId) -> bool {
        self.states.get(channel).is_some_and(|s| s.active)
    }

    /// Back to dormant. The last event id is kept.
    pub fn reset(&self, channel: &ChannelId) {
        if let Some(mut state) = self.states.get_mut(channel) {
            state.active = false;
        }
    }

    pub fn state(&self, channel: &ChannelId) -> ChannelState {
        self.states
            .get(channel)
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(id: &str) -> ChannelId {
        ChannelId::from(id)
    }

    fn e(id: &str) -> EventId {
        EventId::from(id)
    }

    #[test]
    fn dormant_until_trigger_word() {
        let activation = ChannelActivation::new("ove").unwrap();
        assert!(!activation.trigger(&c("1"), "hello everyone"));
        assert!(!activation.is_active(&c("1")));
        assert!(activation.trigger(&c("1"), "hey Ove, you there?"));
        assert!(activation.is_active(&c("1")));
    }

    #[test]
    fn stays_active_without_trigger() {
        let activation = ChannelActivation::new("ove").unwrap();
        activation.trigger(&c("1"), "OVE!");
        assert!(activation.trigger(&c("1"), "no keyword here"));
    }

    #[test]
    fn matches_whole_words_only() {
        let activation = ChannelActivation::new("ove").unwrap();
        assert!(!activation.trigger(&c("1"), "I love overalls and stoves"));
        assert!(activation.trigger(&c("1"), "(ove)"));
    }

    #[test]
    fn trigger_word_is_escaped() {
        let activation = ChannelActivation::new("o.ve").unwrap();
        assert!(!activation.trigger(&c("1"), "oxve"));
        assert!(activation.trigger(&c("1"), "hi O.VE"));
    }

    #[test]
    fn trigger_with_symbol_edges_matches() {
        let activation = ChannelActivation::new("@ove").unwrap();
        assert!(!activation.trigger(&c("1"), "mail me at me@overall.net"));
        assert!(!activation.trigger(&c("1"), "@overalls"));
        assert!(activation.trigger(&c("1"), "@ove what's up?"));

        let activation = ChannelActivation::new("ove!").unwrap();
        assert!(activation.trigger(&c("2"), "hey OVE!"));
    }

    #[test]
    fn empty_trigger_means_always_active() {
        let activation = ChannelActivation::new("  ").unwrap();
        assert!(activation.trigger(&c("1"), "anything"));
    }

    #[test]
    fn channels_are_independent() {
        let activation = ChannelActivation::new("ove").unwrap();
        activation.trigger(&c("1"), "ove");
        assert!(!activation.is_active(&c("2")));
    }

    #[test]
    fn duplicate_event_is_rejected() {
        let activation = ChannelActivation::new("ove").unwrap();
        assert!(activation.observe(&c("1"), &e("m1")));
        assert!(!activation.observe(&c("1"), &e("m1")));
        assert!(activation.observe(&c("1"), &e("m2")));
        // Same id in another channel is a different event.
        assert!(activation.observe(&c("2"), &e("m2")));
    }

    #[test]
    fn reset_returns_to_dormant_and_keeps_last_event() {
        let activation = ChannelActivation::new("ove").unwrap();
        activation.observe(&c("1"), &e("m1"));
        activation.trigger(&c("1"), "ove");
        activation.reset(&c("1"));

        assert_eq!(
            activation.state(&c("1")),
            ChannelState {
                active: false,
                last_event: Some(e("m1")),
            }
        );
        assert!(!activation.observe(&c("1"), &e("m1")));
        assert!(!activation.trigger(&c("1"), "still there?"));
    }

    #[test]
    fn concurrent_observe_admits_once() {
        let activation = std::sync::Arc::new(ChannelActivation::new("ove").unwrap());
        let admitted: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let activation = std::sync::Arc::clone(&activation);
                    scope.spawn(move || activation.observe(&c("1"), &e("same")) as usize)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(admitted, 1);
    }
}
