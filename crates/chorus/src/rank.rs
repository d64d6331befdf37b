// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chorus rank` command implementation.
//!
//! Scores the stored roster against a simulated pause and prints the full
//! breakdown, highest first, marking the persona that would be selected.

use std::collections::BTreeSet;

use chorus_agent::observer_marker_key;
use chorus_config::ChorusConfig;
use chorus_core::{ChorusError, PartStore, PauseType, Persona};
use chorus_engines::QuietTracker;
use chorus_scoring::cooldown::SUMMARY_WINDOW;
use chorus_scoring::{HeuristicScorer, ScoreBreakdown, ScoreContext, entries_since_marker, select};
use chorus_storage::SqliteStore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

#[derive(Debug)]
pub struct RankArgs {
    pub db: String,
    pub pause: PauseType,
    pub text: String,
    pub seed: Option<u64>,
    pub grounding: bool,
    pub json: bool,
}

/// Rank `roster` without touching the store.
pub fn rank_roster(
    config: &ChorusConfig,
    roster: &[Persona],
    args: &RankArgs,
    avoidance_patterns: &[String],
    observer_gap: Option<usize>,
) -> Vec<ScoreBreakdown> {
    let now = chrono::Utc::now();
    let quiet_ids = if config.features.quiet_return {
        QuietTracker::new(&config.quiet).quiet_set(roster, now)
    } else {
        BTreeSet::new()
    };
    let ctx = ScoreContext {
        pause_type: args.pause,
        recent_text: &args.text,
        recent_speakers: &[],
        current_emotion: None,
        grounding_active: args.grounding,
        quiet_part_ids: &quiet_ids,
        avoidance_patterns,
        entries_since_observer_spoke: observer_gap,
    };
    let mut rng = match args.seed.or(config.agent.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    HeuristicScorer::new(config).rank(roster, &ctx, &mut rng)
}

/// Plain-text table, one line per persona, the winner marked with `*`.
pub fn render_ranking(ranking: &[ScoreBreakdown]) -> String {
    let winner = select(ranking).map(|b| b.part_id.as_str());
    let mut out = String::new();
    for b in ranking {
        let mark = if Some(b.part_id.as_str()) == winner { '*' } else { ' ' };
        out.push_str(&format!("{mark} {b}\n"));
    }
    if winner.is_none() {
        out.push_str("no persona scored above zero; the pause would pass silently\n");
    }
    out
}

/// Run the `chorus rank` command.
pub async fn run_rank(config: &ChorusConfig, args: &RankArgs) -> Result<(), ChorusError> {
    let store = SqliteStore::open(&args.db).await?;
    let roster = store.list_parts().await?;
    if roster.is_empty() {
        return Err(ChorusError::NotFound {
            kind: "roster",
            id: args.db.clone(),
        });
    }

    let profile = store.user_profile().await?.unwrap_or_default();
    let observer_gap = if config.features.quiet_observer {
        let marker = store
            .get_marker(&observer_marker_key(&config.observer.part_id))
            .await?;
        let summaries = store.recent_summaries(SUMMARY_WINDOW).await?;
        // No live entry here, so any stored marker counts as a past entry.
        entries_since_marker(marker.as_deref(), "", &summaries)
    } else {
        None
    };
    debug!(parts = roster.len(), ?observer_gap, "ranking stored roster");

    let ranking = rank_roster(config, &roster, args, &profile.avoidance_patterns, observer_gap);
    if args.json {
        let rendered = serde_json::to_string_pretty(&ranking)
            .map_err(|e| ChorusError::Internal(format!("failed to render ranking: {e}")))?;
        println!("{rendered}");
    } else {
        print!("{}", render_ranking(&ranking));
    }
    store.close().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::PartRole;

    fn args(pause: PauseType, grounding: bool) -> RankArgs {
        RankArgs {
            db: String::new(),
            pause,
            text: "I can't stop thinking about the deadline".into(),
            seed: Some(3),
            grounding,
            json: false,
        }
    }

    fn roster() -> Vec<Persona> {
        vec![
            Persona::new("planner", "Planner", PartRole::Manager),
            Persona::new("center", "Center", PartRole::SelfEnergy),
            Persona::new("watcher", "Watcher", PartRole::Protector),
        ]
    }

    #[test]
    fn seeded_ranking_is_reproducible() {
        let config = ChorusConfig::default();
        let a = rank_roster(&config, &roster(), &args(PauseType::SentenceComplete, false), &[], None);
        let b = rank_roster(&config, &roster(), &args(PauseType::SentenceComplete, false), &[], None);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn grounding_puts_center_first() {
        let config = ChorusConfig::default();
        let ranking = rank_roster(&config, &roster(), &args(PauseType::LongPause, true), &[], None);
        assert_eq!(ranking[0].part_id, "center");
        let rendered = render_ranking(&ranking);
        assert!(rendered.starts_with("* center"));
    }

    #[test]
    fn disabled_observer_is_listed_last() {
        let config = ChorusConfig::default();
        let ranking = rank_roster(&config, &roster(), &args(PauseType::LongPause, false), &[], None);
        let last = ranking.last().unwrap();
        assert_eq!(last.part_id, "watcher");
        assert!(last.disabled);
        assert!(render_ranking(&ranking).contains("(disabled)"));
    }

    #[test]
    fn empty_winner_is_reported() {
        let rendered = render_ranking(&[]);
        assert!(rendered.contains("pass silently"));
    }
}
