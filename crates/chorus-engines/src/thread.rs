// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread: resurface something the writer left unfinished.
//!
//! Two strategies run in order. First, explicit unfinished language in
//! stored summaries. Failing that, themes that appear in exactly one summary
//! of the window. Candidates rank by overlap with the current text, then
//! recency.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chorus_config::model::ThreadConfig;
use chorus_core::{ChorusError, EntrySummary, PartStore};
use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use tracing::{debug, warn};

use crate::text::{content_words, overlap, roll};

static UNFINISHED_SIGNALS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(haven'?t|have not|never)\s+(decided|finished|figured|resolved|told)\b")
            .unwrap(),
        Regex::new(r"(?i)\bnot\s+sure\s+(yet|what|how|whether|if)\b").unwrap(),
        Regex::new(r"(?i)\bstill\s+(figuring|deciding|wondering|unsure|working)\b").unwrap(),
        Regex::new(r"(?i)\b(unfinished|unresolved|undecided|unanswered)\b").unwrap(),
        Regex::new(r"(?i)\b(come|get|go)\s+back\s+to\b").unwrap(),
        Regex::new(r"(?i)\bleft\s+(it|off)\b").unwrap(),
        Regex::new(r"(?i)\bto\s+be\s+continued\b").unwrap(),
    ]
});

/// Whether `text` reads as explicitly unfinished.
pub fn has_unfinished_signal(text: &str) -> bool {
    UNFINISHED_SIGNALS.iter().any(|p| p.is_match(text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadSource {
    /// The summary said so, in its open threads or in unfinished language.
    Unfinished,
    /// A theme that came up once and never again.
    Orphaned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSuggestion {
    pub entry_id: String,
    pub topic: String,
    pub source: ThreadSource,
    pub days_ago: i64,
}

struct Candidate<'s> {
    summary: &'s EntrySummary,
    topic: &'s str,
    overlap: usize,
    position: usize,
}

/// Highest overlap wins; ties go to the newer summary.
fn best<'s>(candidates: impl Iterator<Item = Candidate<'s>>) -> Option<Candidate<'s>> {
    candidates.min_by_key(|c| (std::cmp::Reverse(c.overlap), c.position))
}

/// Pick a thread from `summaries` (newest first).
pub fn find_thread(
    summaries: &[EntrySummary],
    current_text: &str,
    current_entry_id: &str,
    now: DateTime<Utc>,
) -> Option<ThreadSuggestion> {
    let current = content_words(current_text);
    let window: Vec<(usize, &EntrySummary)> = summaries
        .iter()
        .enumerate()
        .filter(|(_, s)| s.entry_id != current_entry_id)
        .collect();

    let unfinished = window.iter().flat_map(|&(position, summary)| {
        let explicit = summary.unresolved_threads.iter().map(String::as_str);
        let signalled = summary
            .key_moments
            .iter()
            .map(String::as_str)
            .chain(summary.emotional_arc.as_deref())
            .filter(|t| has_unfinished_signal(t));
        explicit
            .chain(signalled)
            .filter(|t| !t.trim().is_empty())
            .map(move |topic| (position, summary, topic))
    });
    let mut pick = best(unfinished.map(|(position, summary, topic)| Candidate {
        summary,
        topic,
        overlap: overlap(&content_words(topic), &current),
        position,
    }))
    .map(|c| (c, ThreadSource::Unfinished));

    if pick.is_none() {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for (_, summary) in &window {
            for theme in &summary.themes {
                *counts.entry(theme.trim().to_lowercase()).or_default() += 1;
            }
        }
        let counts = &counts;
        let orphans = window.iter().flat_map(|&(position, summary)| {
            summary
                .themes
                .iter()
                .filter(move |t| {
                    let key = t.trim().to_lowercase();
                    !key.is_empty() && counts.get(&key) == Some(&1)
                })
                .map(move |topic| Candidate {
                    summary,
                    topic: topic.trim(),
                    overlap: 0,
                    position,
                })
        });
        pick = best(orphans.map(|mut c| {
            c.overlap = overlap(&content_words(c.topic), &current);
            c
        }))
        .map(|c| (c, ThreadSource::Orphaned));
    }

    pick.map(|(c, source)| ThreadSuggestion {
        entry_id: c.summary.entry_id.clone(),
        topic: c.topic.trim().to_string(),
        source,
        days_ago: (now - c.summary.created_at).num_days(),
    })
}

pub struct ThreadEngine<'a> {
    config: &'a ThreadConfig,
}

impl<'a> ThreadEngine<'a> {
    pub fn new(config: &'a ThreadConfig) -> Self {
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
    ) -> Option<ThreadSuggestion> {
        let result: Result<_, ChorusError> = async {
            let summaries = store.recent_summaries(self.config.window).await?;
            Ok(find_thread(&summaries, current_text, current_entry_id, now))
        }
        .await;
        match result {
            Ok(found) => {
                if let Some(t) = &found {
                    debug!(entry_id = %t.entry_id, source = ?t.source, "thread found");
                }
                found
            }
            Err(e) => {
                warn!(error = %e, "thread lookup failed");
                None
            }
        }
    }
}
