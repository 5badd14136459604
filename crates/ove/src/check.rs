// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ove check` command implementation.

use std::fmt::Write;

use ove_config::OveConfig;

fn presence(value: Option<&str>) -> &'static str {
    match value {
        Some(v) if !v.trim().is_empty() => "set",
        _ => "not set",
    }
}

/// Human-readable configuration summary. Secrets are reported only as set or not set.
pub fn summary(config: &OveConfig) -> String {
    let mut out = String::new();
    let backend = &config.backend;
    let history = &config.history;

    let _ = writeln!(out, "bot");
    let _ = writeln!(out, "  name:            {}", config.bot.name);
    let _ = writeln!(out, "  trigger word:    {}", config.bot.trigger_word);
    let _ = writeln!(out, "  command prefix:  {}", config.bot.command_prefix);
    let _ = writeln!(out, "discord");
    let _ = writeln!(out, "  token:           {}", presence(config.discord.token.as_deref()));
    let _ = writeln!(out, "  fetch roster:    {}", config.discord.fetch_roster);
    let _ = writeln!(out, "backend");
    let _ = writeln!(out, "  kind:            {:?}", backend.kind);
    let _ = writeln!(out, "  base url:        {}", backend.base_url);
    let _ = writeln!(out, "  api key:         {}", presence(backend.api_key.as_deref()));
    let _ = writeln!(out, "  models:          {}", backend.models.join(", "));
    let _ = writeln!(out, "  timeout:         {}s", backend.timeout_secs);
    let _ = writeln!(out, "history");
    if history.enabled {
        let _ = writeln!(out, "  store:           {:?}", history.backend);
        let _ = writeln!(out, "  max entries:     {}", history.max_entries);
    } else {
        let _ = writeln!(out, "  disabled");
    }
    if config.health.enabled {
        let _ = writeln!(
            out,
            "health:            {}:{}",
            config.health.bind_address, config.health.port
        );
    }
    out
}
