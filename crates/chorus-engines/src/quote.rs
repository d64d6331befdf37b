// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quote: hand a past fragment to the speaking persona's prompt.
//!
//! Unlike an echo, a quote never reaches the writer on its own; the persona
//! may choose to reference it.

use chorus_config::model::QuoteConfig;
use chorus_core::{ChorusError, PartStore};
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, warn};

use crate::fragment::{PastFragment, best_past_fragment};
use crate::text::roll;

pub struct QuoteEngine<'a> {
    config: &'a QuoteConfig,
}

impl<'a> QuoteEngine<'a> {
    pub fn new(config: &'a QuoteConfig) -> Self {
        Self { config }
    }

    pub fn gate<R: Rng>(&self, enabled: bool, rng: &mut R) -> bool {
        enabled && roll(rng, self.config.chance)
    }

    pub async fn find(
        &self,
        store: &dyn PartStore,
        current_text: &str,
        current_entry_id: &str,
        now: DateTime<Utc>,
    ) -> Option<PastFragment> {
        match self.try_find(store, current_text, current_entry_id, now).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "quote lookup failed");
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
    ) -> Result<Option<PastFragment>, ChorusError> {
        let entries = store.recent_entries(self.config.window).await?;
        let found = best_past_fragment(
            &entries,
            current_text,
            current_entry_id,
            now,
            self.config.min_age_days,
        );
        if let Some(f) = &found {
            debug!(entry_id = %f.entry_id, overlap = f.overlap, "quote found");
        }
        Ok(found)
    }
}
