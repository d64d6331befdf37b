// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fragment extraction shared by the Echo and Quote engines.
//!
//! A fragment is one or two consecutive sentences of a past entry, between
//! 20 and 300 characters, chosen by word overlap with what the writer is
//! writing now. No overlap means no fragment.

use std::collections::BTreeSet;

use chorus_core::Entry;
use chrono::{DateTime, Utc};

use crate::text::{content_words, overlap, sentences};

pub const MIN_FRAGMENT_CHARS: usize = 20;
pub const MAX_FRAGMENT_CHARS: usize = 300;

/// A fragment of a past entry chosen for the current text.
#[derive(Debug, Clone, PartialEq)]
pub struct PastFragment {
    pub entry_id: String,
    pub text: String,
    /// Content words shared with the current text. Always at least one.
    pub overlap: usize,
    pub written_at: DateTime<Utc>,
    pub days_ago: i64,
}

fn within_bounds(text: &str) -> bool {
    (MIN_FRAGMENT_CHARS..=MAX_FRAGMENT_CHARS).contains(&text.chars().count())
}

/// Best one- or two-sentence window of `content`, with its overlap score.
///
/// Ties keep the earliest window.
pub fn best_fragment(content: &str, current: &BTreeSet<String>) -> Option<(String, usize)> {
    let sents = sentences(content);
    let mut best: Option<(String, usize)> = None;

    for (i, first) in sents.iter().enumerate() {
        let mut windows = vec![first.to_string()];
        if let Some(second) = sents.get(i + 1) {
            windows.push(format!("{first} {second}"));
        }
        for window in windows {
            if !within_bounds(&window) {
                continue;
            }
            let score = overlap(&content_words(&window), current);
            if score > 0 && best.as_ref().is_none_or(|(_, s)| score > *s) {
                best = Some((window, score));
            }
        }
    }
    best
}

/// Pick the best fragment across `entries` (newest first).
///
/// Skips `exclude_entry_id` and entries younger than `min_age_days`. Ties
/// keep the more recent entry.
pub fn best_past_fragment(
    entries: &[Entry],
    current_text: &str,
    exclude_entry_id: &str,
    now: DateTime<Utc>,
    min_age_days: i64,
) -> Option<PastFragment> {
    let current = content_words(current_text);
    if current.is_empty() {
        return None;
    }

    let mut best: Option<PastFragment> = None;
    for entry in entries {
        if entry.id == exclude_entry_id {
            continue;
        }
        let days_ago = (now - entry.created_at).num_days();
        if days_ago < min_age_days {
            continue;
        }
        let Some((text, score)) = best_fragment(&entry.content, &current) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| score > b.overlap) {
            best = Some(PastFragment {
                entry_id: entry.id.clone(),
                text,
                overlap: score,
                written_at: entry.created_at,
                days_ago,
            });
        }
    }
    best
}
