// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Echo: surface a fragment of an older entry directly to the writer.
//!
//! A successful echo replaces the persona response for that cycle.

use chorus_config::model::EchoConfig;
use chorus_core::{ChorusError, EchoPayload, PartStore};
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, warn};

use crate::fragment::best_past_fragment;
use crate::text::roll;

pub struct EchoEngine<'a> {
    config: &'a EchoConfig,
}

impl<'a> EchoEngine<'a> {
    pub fn new(config: &'a EchoConfig) -> Self {
        Self { config }
    }

    /// Whether to look for an echo this cycle.
    pub fn gate<R: Rng>(
        &self,
        enabled: bool,
        grounding_active: bool,
        echoes_this_session: usize,
        rng: &mut R,
    ) -> bool {
        enabled
            && !grounding_active
            && echoes_this_session < self.config.max_per_session
            && roll(rng, self.config.chance)
    }

    /// Find an echo for `current_text`. Store failures yield `None`.
    pub async fn find(
        &self,
        store: &dyn PartStore,
        current_text: &str,
        current_entry_id: &str,
        now: DateTime<Utc>,
    ) -> Option<EchoPayload> {
        match self.try_find(store, current_text, current_entry_id, now).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "echo lookup failed");
                None
            }
        }
    }

    async fn try_find(
        &self,
        store: &dyn PartStore,
        current_text: &str,
        current_entry_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<EchoPayload>, ChorusError> {
        let entries = store.recent_entries(self.config.window).await?;
        let found = best_past_fragment(
            &entries,
            current_text,
            current_entry_id,
            now,
            self.config.min_age_days,
        );
        if let Some(f) = &found {
            debug!(entry_id = %f.entry_id, overlap = f.overlap, days_ago = f.days_ago, "echo found");
        }
        Ok(found.map(|f| EchoPayload {
            entry_id: f.entry_id,
            fragment: f.text,
            written_at: f.written_at,
            days_ago: f.days_ago,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn always() -> EchoConfig {
        EchoConfig {
            chance: 1.0,
            ..EchoConfig::default()
        }
    }

    #[test]
    fn gate_requires_feature_flag() {
        let config = always();
        let engine = EchoEngine::new(&config);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!engine.gate(false, false, 0, &mut rng));
        assert!(engine.gate(true, false, 0, &mut rng));
    }

    #[test]
    fn gate_is_suppressed_in_grounding() {
        let config = always();
        let engine = EchoEngine::new(&config);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!engine.gate(true, true, 0, &mut rng));
    }

    #[test]
    fn gate_honors_session_cap() {
        let config = always();
        let engine = EchoEngine::new(&config);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(engine.gate(true, false, 1, &mut rng));
        assert!(!engine.gate(true, false, 2, &mut rng));
    }

    #[test]
    fn zero_chance_never_passes() {
        let config = EchoConfig {
            chance: 0.0,
            ..EchoConfig::default()
        };
        let engine = EchoEngine::new(&config);
        let mut rng = StdRng::seed_from_u64(0);
        assert!((0..100).all(|_| !engine.gate(true, false, 0, &mut rng)));
    }
}
