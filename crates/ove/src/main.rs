// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ove - a Discord relay for AI Horde and chat-completions text generation.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod health;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ove_config::{ConfigError, OveConfig};

/// Ove - a Discord relay for AI Horde and chat-completions text generation.
#[derive(Parser, Debug)]
#[command(name = "ove", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default search path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Connect to Discord and relay messages (default).
    Serve,
    /// Load and validate configuration, then print a summary.
    Check,
}

fn load(path: Option<&PathBuf>) -> Result<OveConfig, Vec<ConfigError>> {
    match path {
        Some(path) => ove_config::load_and_validate_path(path),
        None => ove_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            ove_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(errors) = ove_config::require_credentials(&config) {
                ove_config::render_errors(&errors);
                std::process::exit(1);
            }
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Check => {
            print!("{}", check::summary(&config));
            if let Err(errors) = ove_config::require_credentials(&config) {
                ove_config::render_errors(&errors);
                std::process::exit(1);
            }
        }
    }
}
