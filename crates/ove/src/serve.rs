// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ove serve` command implementation.
//!
//! Opens the history store, builds the inference backend and relay, starts
//! the health endpoint, and runs the Discord gateway until a shutdown signal.

use std::sync::Arc;

use ove_agent::{install_signal_handler, Relay};
use ove_config::OveConfig;
use ove_core::error::OveError;
use ove_discord::DiscordAdapter;
use tracing::{debug, info, warn};

use crate::health;

pub async fn run_serve(config: OveConfig) -> Result<(), OveError> {
    init_tracing(&config.bot.log_level);

    info!(name = %config.bot.name, "starting ove serve");
    log_allocator_stats();

    let cancel = install_signal_handler();

    let store = ove_storage::open_history_store(&config.history).await?;
    let backend = ove_inference::build_backend(&config)?;
    let relay = Arc::new(Relay::from_config(
        &config,
        Arc::clone(&store),
        backend,
        cancel.clone(),
    )?);

    let health_task = config.health.enabled.then(|| {
        let addr = format!("{}:{}", config.health.bind_address, config.health.port);
        tokio::spawn(health::serve(addr, cancel.clone()))
    });

    let adapter = DiscordAdapter::new(&config.discord)?;
    let result = adapter.run(relay, cancel.clone()).await;

    // The gateway may stop on its own; make sure everything else follows.
    cancel.cancel();

    if let Some(task) = health_task {
        match task.await {
            Ok(Err(e)) => warn!(error = %e, "health server failed"),
            Err(e) => warn!(error = %e, "health server task panicked"),
            Ok(Ok(())) => {}
        }
    }

    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "history store shutdown failed");
    }

    info!("ove serve shutdown complete");
    result
}

#[cfg(not(target_env = "msvc"))]
fn log_allocator_stats() {
    let _ = tikv_jemalloc_ctl::epoch::advance();
    let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
    let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
    debug!(allocated, resident, "jemalloc stats at startup");
}

#[cfg(target_env = "msvc")]
fn log_allocator_stats() {}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ove={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
