// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rewrites `@{name}` placeholders in generated text into platform mentions.

use std::sync::LazyLock;

use ove_core::types::RosterMember;
use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\{([^{}]+)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, Copy, Default)]
pub struct MentionResolver;

impl MentionResolver {
    pub fn new() -> Self {
        Self
    }

    /// Replace every `@{name}` whose name matches a roster member's username,
    /// or failing that a display name, with `<@id>`. Unmatched placeholders
    /// are left as they are.
    pub fn resolve(&self, text: &str, roster: &[RosterMember]) -> String {
        if roster.is_empty() {
            return text.to_string();
        }

        PLACEHOLDER
            .replace_all(text, |caps: &Captures<'_>| {
                let wanted = normalize(&caps[1]);
                find_member(&wanted, roster)
                    .map(|member| format!("<@{}>", member.id))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn normalize(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix('@').unwrap_or(name).trim().to_lowercase()
}

fn find_member<'a>(wanted: &str, roster: &'a [RosterMember]) -> Option<&'a RosterMember> {
    if wanted.is_empty() {
        return None;
    }
    roster
        .iter()
        .find(|m| normalize(&m.username) == wanted)
        .or_else(|| {
            roster.iter().find(|m| {
                m.display_name
                    .as_deref()
                    .is_some_and(|d| normalize(d) == wanted)
            })
        })
}
