// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quiet tracking: which personas have gone quiet, and which are returning.
//!
//! A persona is quiet once it has not spoken for longer than the threshold.
//! At session start quiet personas are stamped with `quiet_since`; the stamp
//! marks them as returning until they next speak, which clears it.

use std::collections::BTreeSet;

use chorus_config::model::QuietConfig;
use chorus_core::{ChorusError, PartStore, Persona};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

pub struct QuietTracker<'a> {
    config: &'a QuietConfig,
}

impl<'a> QuietTracker<'a> {
    pub fn new(config: &'a QuietConfig) -> Self {
        Self { config }
    }

    fn threshold(&self) -> Duration {
        Duration::try_days(self.config.threshold_days).unwrap_or(Duration::MAX)
    }

    /// Inactive beyond the threshold. A persona that never spoke is not quiet.
    pub fn is_quiet(&self, persona: &Persona, now: DateTime<Utc>) -> bool {
        persona
            .last_active_at
            .is_some_and(|at| now - at > self.threshold())
    }

    /// Carries a `quiet_since` stamp that has not been cleared by speaking.
    pub fn is_returning(&self, persona: &Persona) -> bool {
        persona.quiet_since.is_some()
    }

    /// Whole days since the persona last spoke, when it is quiet or returning.
    pub fn days_quiet(&self, persona: &Persona, now: DateTime<Utc>) -> Option<i64> {
        if !self.is_quiet(persona, now) && !self.is_returning(persona) {
            return None;
        }
        persona.last_active_at.map(|at| (now - at).num_days())
    }

    pub fn quiet_set(&self, roster: &[Persona], now: DateTime<Utc>) -> BTreeSet<String> {
        roster
            .iter()
            .filter(|p| self.is_quiet(p, now))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Stamp `quiet_since` on newly quiet personas, in the store and in
    /// `roster`. Returns how many were stamped; store failures are logged
    /// and skipped.
    pub async fn mark_quiet(
        &self,
        store: &dyn PartStore,
        roster: &mut [Persona],
        now: DateTime<Utc>,
    ) -> usize {
        let mut marked = 0;
        for persona in roster.iter_mut() {
            if persona.quiet_since.is_some() || !self.is_quiet(persona, now) {
                continue;
            }
            match store
                .set_part_timestamps(&persona.id, persona.last_active_at, Some(now))
                .await
            {
                Ok(()) => {
                    persona.quiet_since = Some(now);
                    marked += 1;
                    info!(part_id = %persona.id, "part marked quiet");
                }
                Err(e) => warn!(part_id = %persona.id, error = %e, "failed to mark part quiet"),
            }
        }
        marked
    }

    /// Record that `persona` just spoke: stamp `last_active_at`, clear
    /// `quiet_since`.
    pub async fn mark_active(
        &self,
        store: &dyn PartStore,
        persona: &mut Persona,
        now: DateTime<Utc>,
    ) -> Result<(), ChorusError> {
        store.set_part_timestamps(&persona.id, Some(now), None).await?;
        persona.last_active_at = Some(now);
        persona.quiet_since = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::PartRole;

    fn persona(days_since_active: Option<i64>) -> Persona {
        let mut p = Persona::new("p", "P", PartRole::Manager);
        p.last_active_at = days_since_active.map(|d| Utc::now() - Duration::days(d));
        p
    }

    #[test]
    fn quiet_after_threshold() {
        let config = QuietConfig::default();
        let tracker = QuietTracker::new(&config);
        let now = Utc::now();
        assert!(!tracker.is_quiet(&persona(Some(3)), now));
        assert!(tracker.is_quiet(&persona(Some(8)), now));
        assert!(!tracker.is_quiet(&persona(None), now));
    }

    #[test]
    fn returning_follows_quiet_since() {
        let config = QuietConfig::default();
        let tracker = QuietTracker::new(&config);
        let mut p = persona(Some(10));
        assert!(!tracker.is_returning(&p));
        p.quiet_since = Some(Utc::now());
        assert!(tracker.is_returning(&p));
        assert_eq!(tracker.days_quiet(&p, Utc::now()), Some(10));
    }

    #[test]
    fn out_of_range_threshold_never_marks_quiet() {
        let config = QuietConfig {
            threshold_days: i64::MAX,
            ..QuietConfig::default()
        };
        let tracker = QuietTracker::new(&config);
        assert!(!tracker.is_quiet(&persona(Some(40_000)), Utc::now()));
    }

    #[test]
    fn days_quiet_is_none_for_active_persona() {
        let config = QuietConfig::default();
        let tracker = QuietTracker::new(&config);
        assert_eq!(tracker.days_quiet(&persona(Some(2)), Utc::now()), None);
    }
}
