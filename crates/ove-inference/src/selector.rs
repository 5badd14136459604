// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Candidate model ordering from live capacity signals.

use ove_config::model::BackendConfig;
use ove_core::traits::InferenceBackend;
use ove_core::types::ModelCandidate;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

/// Orders candidate models for one inference call.
///
/// The ordering is advisory: the caller tries each entry in turn.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    fallback: Vec<String>,
    restrict_to_listed: bool,
    max_candidates: usize,
}

impl ModelSelector {
    pub fn new(fallback: Vec<String>, restrict_to_listed: bool, max_candidates: usize) -> Self {
        Self {
            fallback,
            restrict_to_listed,
            max_candidates: max_candidates.max(1),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(
            config.models.clone(),
            config.restrict_to_listed,
            config.max_candidates,
        )
    }

    /// Query live capacity and rank it; fall back to the static list in random order.
    pub async fn select_order(&self, backend: &dyn InferenceBackend) -> Vec<String> {
        match backend.capacity().await {
            Ok(candidates) => {
                let ranked = self.rank(candidates);
                if !ranked.is_empty() {
                    debug!(candidates = ?ranked, "ranked live models");
                    return ranked;
                }
                debug!("no usable live capacity, using fallback models");
            }
            Err(e) => warn!(error = %e, "capacity query failed, using fallback models"),
        }
        self.fallback_order()
    }

    /// Keep models with workers, optionally only listed ones, fewest queued first.
    pub fn rank(&self, candidates: Vec<ModelCandidate>) -> Vec<String> {
        let mut usable: Vec<ModelCandidate> = candidates
            .into_iter()
            .filter(|c| c.workers > 0)
            .filter(|c| !self.restrict_to_listed || self.is_listed(&c.identifier))
            .collect();

        usable.sort_by_key(|c| (c.queue_depth, c.estimated_wait_secs));
        usable.truncate(self.max_candidates);
        usable.into_iter().map(|c| c.identifier).collect()
    }

    pub fn fallback_order(&self) -> Vec<String> {
        let mut models = self.fallback.clone();
        models.shuffle(&mut rand::thread_rng());
        models
    }

    /// Live names may carry a runtime prefix, e.g. `koboldcpp/Pygmalion-2-7b`.
    fn is_listed(&self, identifier: &str) -> bool {
        if self.fallback.is_empty() {
            return true;
        }
        let bare = identifier.rsplit('/').next().unwrap_or(identifier);
        self.fallback
            .iter()
            .any(|m| m.eq_ignore_ascii_case(identifier) || m.eq_ignore_ascii_case(bare))
    }
}
