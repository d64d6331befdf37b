// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic persona scorer.
//!
//! Every term is recorded in a [`ScoreBreakdown`] so a ranking can be
//! explained after the fact. Terms apply in a fixed order; the quiet-return
//! multiplier comes last and scales the whole additive score, negative or not.

use std::collections::BTreeSet;
use std::fmt;

use chorus_config::ChorusConfig;
use chorus_core::{EmotionTag, PartRole, PauseType, Persona};
use rand::Rng;
use serde::Serialize;

use crate::tables::{pause_affinity, role_emotions, role_keywords};

/// Per-cycle inputs shared by every persona's score.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    pub pause_type: PauseType,
    /// Tail window of text near the cursor.
    pub recent_text: &'a str,
    /// Persona ids, most recent first.
    pub recent_speakers: &'a [String],
    pub current_emotion: Option<EmotionTag>,
    pub grounding_active: bool,
    /// Personas inactive beyond the quiet threshold.
    pub quiet_part_ids: &'a BTreeSet<String>,
    /// The writer's known avoidance patterns, from the user profile.
    pub avoidance_patterns: &'a [String],
    /// Entries elapsed since the quiet observer last spoke, if it applies.
    pub entries_since_observer_spoke: Option<usize>,
}

/// One persona's score with each term broken out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub part_id: String,
    pub recency: f64,
    pub affinity: f64,
    pub relevance: f64,
    pub emotion: f64,
    pub jitter: f64,
    pub grounding: f64,
    /// Sum of the quiet observer's extra terms.
    pub observer: f64,
    pub quiet_penalty: f64,
    /// 1.0 unless the persona is returning from a quiet period.
    pub multiplier: f64,
    pub total: f64,
    /// The observer was short-circuited to the disabled sentinel.
    pub disabled: bool,
}

impl ScoreBreakdown {
    fn new(part_id: &str) -> Self {
        Self {
            part_id: part_id.to_string(),
            recency: 0.0,
            affinity: 0.0,
            relevance: 0.0,
            emotion: 0.0,
            jitter: 0.0,
            grounding: 0.0,
            observer: 0.0,
            quiet_penalty: 0.0,
            multiplier: 1.0,
            total: 0.0,
            disabled: false,
        }
    }

    fn additive(&self) -> f64 {
        self.recency
            + self.affinity
            + self.relevance
            + self.emotion
            + self.jitter
            + self.grounding
            + self.observer
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disabled {
            return write!(f, "{:<14} {:>8.1}  (disabled)", self.part_id, self.total);
        }
        write!(
            f,
            "{:<14} {:>8.1}  recency {:>5.0} affinity {:>3.0} relevance {:>3.0} emotion {:>3.0} \
             jitter {:>5.2} grounding {:>4.0} observer {:>5.0} quiet {:>4.0} x{:.1}",
            self.part_id,
            self.total,
            self.recency,
            self.affinity,
            self.relevance,
            self.emotion,
            self.jitter,
            self.grounding,
            self.observer,
            self.quiet_penalty,
            self.multiplier,
        )
    }
}

/// Scores personas against a config snapshot.
pub struct HeuristicScorer<'a> {
    config: &'a ChorusConfig,
}

impl<'a> HeuristicScorer<'a> {
    pub fn new(config: &'a ChorusConfig) -> Self {
        Self { config }
    }

    fn is_observer(&self, persona: &Persona) -> bool {
        !self.config.observer.part_id.is_empty() && persona.id == self.config.observer.part_id
    }

    /// Score one persona. `rng` supplies the jitter term only.
    pub fn score<R: Rng>(
        &self,
        persona: &Persona,
        ctx: &ScoreContext<'_>,
        rng: &mut R,
    ) -> ScoreBreakdown {
        let scoring = &self.config.scoring;
        let mut b = ScoreBreakdown::new(&persona.id);
        let is_observer = self.is_observer(persona);

        if is_observer && !self.config.features.quiet_observer {
            b.total = self.config.observer.disabled_score;
            b.disabled = true;
            return b;
        }

        // Term 1: recency
        b.recency = recency_penalty(
            &persona.id,
            ctx.recent_speakers,
            scoring.recency_penalty_first,
            scoring.recency_penalty_second,
        );

        // Term 2: pause-type affinity
        b.affinity = pause_affinity(persona.role, ctx.pause_type);

        // Term 3: content relevance
        let recent_lower = ctx.recent_text.to_lowercase();
        let matches = keyword_set(persona)
            .iter()
            .filter(|kw| recent_lower.contains(kw.as_str()))
            .count();
        b.relevance = (matches as f64 * scoring.keyword_weight).min(scoring.keyword_cap);

        // Term 4: emotional match
        if let Some(emotion) = ctx.current_emotion
            && (role_emotions(persona.role).contains(&emotion)
                || persona.learned_emotions.contains(&emotion))
        {
            b.emotion = scoring.emotion_bonus;
        }

        // Term 5: jitter
        if scoring.jitter_max > 0.0 {
            b.jitter = rng.gen_range(0.0..scoring.jitter_max);
        }

        // Term 6: grounding
        if ctx.grounding_active {
            let grounding = &self.config.grounding;
            b.grounding = if persona.role == PartRole::SelfEnergy {
                grounding.self_bonus
            } else {
                -grounding.other_penalty
            };
            if is_observer {
                b.grounding -= grounding.observer_penalty;
            }
        }

        // Term 7: quiet penalty, judged on terms 1-6 only
        let quiet = &self.config.quiet;
        if self.config.features.quiet_return {
            let running = b.additive();
            if ctx.quiet_part_ids.contains(&persona.id) && running < quiet.low_score_cutoff {
                b.quiet_penalty = -quiet.low_score_penalty;
            }
            if persona.quiet_since.is_some() {
                b.multiplier = quiet.return_multiplier;
            }
        }

        // Term 8: quiet-observer rules
        if is_observer {
            b.observer = self.observer_adjustment(&persona.id, ctx, &recent_lower);
        }

        // Return multiplier last
        b.total = (b.additive() + b.quiet_penalty) * b.multiplier;
        b
    }

    fn observer_adjustment(&self, part_id: &str, ctx: &ScoreContext<'_>, recent_lower: &str) -> f64 {
        let observer = &self.config.observer;

        let overlap = avoidance_vocabulary(ctx.avoidance_patterns)
            .iter()
            .filter(|word| recent_lower.contains(word.as_str()))
            .count();
        let overlap_bonus = (overlap as f64 * observer.overlap_weight).min(observer.overlap_cap);

        let recency = recency_penalty(
            part_id,
            ctx.recent_speakers,
            observer.recency_penalty_first,
            observer.recency_penalty_second,
        );

        let pause = if ctx.pause_type.is_avoidance_relevant() {
            0.0
        } else {
            -observer.pause_mismatch_penalty
        };

        let cooldown = match ctx.entries_since_observer_spoke {
            Some(n) if n < observer.cooldown_entries => -observer.cooldown_penalty,
            _ => 0.0,
        };

        overlap_bonus + recency + pause + cooldown
    }

    /// Score every persona, returning the ranking highest first.
    ///
    /// The sort is stable, so equal totals keep roster order.
    pub fn rank<R: Rng>(
        &self,
        personas: &[Persona],
        ctx: &ScoreContext<'_>,
        rng: &mut R,
    ) -> Vec<ScoreBreakdown> {
        let mut ranking: Vec<ScoreBreakdown> =
            personas.iter().map(|p| self.score(p, ctx, rng)).collect();
        ranking.sort_by(|a, b| b.total.total_cmp(&a.total));
        tracing::debug!(
            candidates = ranking.len(),
            top = ranking.first().map(|b| b.part_id.as_str()).unwrap_or("-"),
            top_score = ranking.first().map(|b| b.total).unwrap_or_default(),
            "ranked personas"
        );
        ranking
    }
}

/// The winner of a ranking, or `None` when the top score is not positive.
pub fn select(ranking: &[ScoreBreakdown]) -> Option<&ScoreBreakdown> {
    ranking.first().filter(|top| top.total > 0.0)
}

fn recency_penalty(part_id: &str, recent: &[String], first: f64, second: f64) -> f64 {
    match recent.iter().position(|id| id == part_id) {
        Some(0) => -first,
        Some(1) => -second,
        _ => 0.0,
    }
}

/// Union of role keywords, concern tokens and learned keywords, lowercased.
pub fn keyword_set(persona: &Persona) -> BTreeSet<String> {
    role_keywords(persona.role)
        .iter()
        .map(|kw| kw.to_string())
        .chain(persona.concern_tokens())
        .chain(persona.learned_keywords.iter().map(|kw| kw.to_lowercase()))
        .collect()
}

fn avoidance_vocabulary(patterns: &[String]) -> BTreeSet<String> {
    patterns
        .iter()
        .flat_map(|p| p.split(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|w| w.chars().count() > 3)
        .map(str::to_lowercase)
        .collect()
}
