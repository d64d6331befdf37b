// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Silence: a persona visibly chooses not to interrupt a writer in flow.

use std::time::Duration;

use chorus_config::model::SilenceConfig;
use chorus_core::{Persona, SilencePayload};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::text::roll;

pub struct SilenceEngine<'a> {
    config: &'a SilenceConfig,
}

impl<'a> SilenceEngine<'a> {
    pub fn new(config: &'a SilenceConfig) -> Self {
        Self { config }
    }

    /// Requires `flow` of uninterrupted writing at or above the threshold.
    pub fn gate<R: Rng>(
        &self,
        enabled: bool,
        grounding_active: bool,
        flow: Duration,
        rng: &mut R,
    ) -> bool {
        enabled
            && !grounding_active
            && flow >= Duration::from_secs(self.config.flow_threshold_secs)
            && roll(rng, self.config.chance)
    }

    /// A random non-observer persona to hold the silence.
    pub fn pick<R: Rng>(
        &self,
        roster: &[Persona],
        observer_id: &str,
        rng: &mut R,
    ) -> Option<SilencePayload> {
        let candidates: Vec<&Persona> = roster.iter().filter(|p| p.id != observer_id).collect();
        candidates.choose(rng).map(|p| SilencePayload {
            part_id: p.id.clone(),
            name: p.name.clone(),
            color: p.color.clone(),
            color_light: p.color_light.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::PartRole;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn always() -> SilenceConfig {
        SilenceConfig {
            chance: 1.0,
            flow_threshold_secs: 300,
        }
    }

    #[test]
    fn requires_flow_threshold() {
        let config = always();
        let engine = SilenceEngine::new(&config);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!engine.gate(true, false, Duration::from_secs(299), &mut rng));
        assert!(engine.gate(true, false, Duration::from_secs(300), &mut rng));
        assert!(!engine.gate(true, true, Duration::from_secs(900), &mut rng));
    }

    #[test]
    fn never_picks_observer() {
        let config = always();
        let engine = SilenceEngine::new(&config);
        let roster = vec![
            Persona::new("watcher", "Watcher", PartRole::Protector),
            Persona::new("center", "Center", PartRole::SelfEnergy),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            assert_eq!(engine.pick(&roster, "watcher", &mut rng).unwrap().part_id, "center");
        }
        assert!(engine.pick(&roster[..1], "watcher", &mut rng).is_none());
    }
}
