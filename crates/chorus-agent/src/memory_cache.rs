// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session snapshot of the writer's profile and recent summaries.
//!
//! Loaded once at session start so scoring does not hit the store on every
//! pause. A failed load leaves the cache empty.

use chorus_core::{EntrySummary, PartStore, UserProfile};
use chorus_scoring::cooldown::SUMMARY_WINDOW;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct SessionMemoryCache {
    profile: Option<UserProfile>,
    summaries: Vec<EntrySummary>,
}

impl SessionMemoryCache {
    pub fn new(profile: Option<UserProfile>, summaries: Vec<EntrySummary>) -> Self {
        Self { profile, summaries }
    }

    pub async fn load(store: &dyn PartStore) -> Self {
        let profile = store.user_profile().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to load user profile");
            None
        });
        let summaries = store
            .recent_summaries(SUMMARY_WINDOW)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to load entry summaries");
                Vec::new()
            });
        debug!(
            has_profile = profile.is_some(),
            summaries = summaries.len(),
            "session memory loaded"
        );
        Self { profile, summaries }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Newest first, at most [`SUMMARY_WINDOW`].
    pub fn summaries(&self) -> &[EntrySummary] {
        &self.summaries
    }

    pub fn avoidance_patterns(&self) -> &[String] {
        self.profile
            .as_ref()
            .map(|p| p.avoidance_patterns.as_slice())
            .unwrap_or_default()
    }
}
