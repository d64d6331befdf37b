// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Disagreement: let a second persona push back on the one that just spoke.

use std::time::Duration;

use chorus_config::model::DisagreementConfig;
use chorus_core::{PartRole, Persona};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::text::roll;

/// Roles that push back on `speaker`.
pub fn opposing_roles(speaker: PartRole) -> &'static [PartRole] {
    use PartRole::*;
    match speaker {
        Protector => &[Exile],
        Exile => &[Protector],
        Manager => &[Firefighter],
        Firefighter => &[Manager],
        SelfEnergy => &[Protector, Exile, Manager, Firefighter],
    }
}

pub struct DisagreementEngine<'a> {
    config: &'a DisagreementConfig,
}

impl<'a> DisagreementEngine<'a> {
    pub fn new(config: &'a DisagreementConfig) -> Self {
        Self { config }
    }

    pub fn gate<R: Rng>(&self, enabled: bool, grounding_active: bool, rng: &mut R) -> bool {
        enabled && !grounding_active && roll(rng, self.config.chance)
    }

    /// Delay before the follow-up starts.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.config.delay_ms)
    }

    /// Choose who pushes back. Never the speaker, never the quiet observer.
    pub fn pick_challenger<'p, R: Rng>(
        &self,
        speaker: &Persona,
        roster: &'p [Persona],
        observer_id: &str,
        rng: &mut R,
    ) -> Option<&'p Persona> {
        let opposing = opposing_roles(speaker.role);
        let candidates: Vec<&Persona> = roster
            .iter()
            .filter(|p| p.id != speaker.id && p.id != observer_id)
            .filter(|p| opposing.contains(&p.role))
            .collect();
        candidates.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn roster() -> Vec<Persona> {
        vec![
            Persona::new("guardian", "Guardian", PartRole::Protector),
            Persona::new("small", "Small One", PartRole::Exile),
            Persona::new("planner", "Planner", PartRole::Manager),
            Persona::new("spark", "Spark", PartRole::Firefighter),
            Persona::new("center", "Center", PartRole::SelfEnergy),
            Persona::new("watcher", "Watcher", PartRole::Protector),
        ]
    }

    #[test]
    fn opposing_roles_are_symmetric_between_pairs() {
        assert_eq!(opposing_roles(PartRole::Protector), &[PartRole::Exile]);
        assert_eq!(opposing_roles(PartRole::Exile), &[PartRole::Protector]);
        assert_eq!(opposing_roles(PartRole::Manager), &[PartRole::Firefighter]);
        assert!(!opposing_roles(PartRole::SelfEnergy).contains(&PartRole::SelfEnergy));
    }

    #[test]
    fn challenger_is_never_speaker_or_observer() {
        let config = DisagreementConfig::default();
        let engine = DisagreementEngine::new(&config);
        let roster = roster();
        let speaker = &roster[1];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let pick = engine
                .pick_challenger(speaker, &roster, "watcher", &mut rng)
                .unwrap();
            assert_eq!(pick.id, "guardian");
        }
    }

    #[test]
    fn no_opposing_persona_means_no_challenger() {
        let config = DisagreementConfig::default();
        let engine = DisagreementEngine::new(&config);
        let roster = vec![
            Persona::new("planner", "Planner", PartRole::Manager),
            Persona::new("center", "Center", PartRole::SelfEnergy),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        assert!(
            engine
                .pick_challenger(&roster[0], &roster, "watcher", &mut rng)
                .is_none()
        );
    }

    #[test]
    fn grounding_suppresses_disagreement() {
        let config = DisagreementConfig {
            chance: 1.0,
            ..DisagreementConfig::default()
        };
        let engine = DisagreementEngine::new(&config);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(engine.gate(true, false, &mut rng));
        assert!(!engine.gate(true, true, &mut rng));
        assert!(!engine.gate(false, false, &mut rng));
        assert_eq!(engine.delay(), Duration::from_millis(2000));
    }
}
