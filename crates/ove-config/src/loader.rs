// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ove.toml` > `~/.config/ove/ove.toml` > `/etc/ove/ove.toml`
//! with environment variable overrides via `OVE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::OveConfig;

/// Top-level sections, in the order env keys are matched against them.
const SECTIONS: &[&str] = &["bot", "discord", "backend", "generation", "history", "health"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ove/ove.toml` (system-wide)
/// 3. `~/.config/ove/ove.toml` (user XDG config)
/// 4. `./ove.toml` (local directory)
/// 5. Bare `DISCORD_TOKEN` / `HORDE_KEY` environment variables
/// 6. `OVE_*` environment variables
pub fn load_config() -> Result<OveConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<OveConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OveConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OveConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OveConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(OveConfig::default()))
        .merge(Toml::file("/etc/ove/ove.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ove/ove.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ove.toml"))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// Map `OVE_SECTION_KEY` to `section.key`.
///
/// Uses an explicit section table instead of `Env::split("_")` because key
/// names contain underscores: `OVE_BACKEND_API_KEY` must map to
/// `backend.api_key`, not `backend.api.key`.
fn env_provider() -> Env {
    Env::prefixed("OVE_").map(|key| map_env_key(key.as_str()).into())
}

/// Unprefixed variable names used by existing deployments.
fn legacy_env_provider() -> Env {
    Env::raw()
        .only(&["DISCORD_TOKEN", "HORDE_KEY"])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case("DISCORD_TOKEN") {
                "discord.token".into()
            } else {
                "backend.api_key".into()
            }
        })
}

fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("backend_api_key"), "backend.api_key");
        assert_eq!(map_env_key("DISCORD_TOKEN"), "discord.token");
        assert_eq!(map_env_key("history_max_entries"), "history.max_entries");
        assert_eq!(map_env_key("bot_trigger_word"), "bot.trigger_word");
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(map_env_key("logging_level"), "logging_level");
    }
}
