// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Word-level text helpers shared by the engines.

use std::collections::BTreeSet;

use rand::Rng;

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "also", "been", "before", "being", "could", "does", "doing",
    "down", "each", "even", "from", "have", "having", "here", "into", "just", "like", "more",
    "most", "much", "only", "other", "over", "really", "same", "should", "some", "such", "than",
    "that", "their", "them", "then", "there", "these", "they", "thing", "things", "this",
    "those", "through", "very", "want", "were", "what", "when", "where", "which", "while",
    "will", "with", "would", "your",
];

/// Minimum word length, in characters, for a content word.
const MIN_WORD_CHARS: usize = 4;

/// Lowercased content words of `text`: longer than three characters and not a
/// stop word.
pub fn content_words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Number of words shared by two word sets.
pub fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
    a.intersection(b).count()
}

/// Split prose into trimmed sentences, keeping terminal punctuation.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        let terminal = matches!(c, '.' | '!' | '?' | '。' | '！' | '？' | '\n');
        if !terminal {
            continue;
        }
        // Keep runs like "?!" or "..." with their sentence.
        let mut end = idx + c.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?' | '"' | '\u{201D}' | ')') {
                end = next_idx + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        push_trimmed(&mut out, &text[start..end]);
        start = end;
    }
    push_trimmed(&mut out, &text[start..]);
    out
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}

/// Probability gate. Chances at or below zero never pass; at or above one
/// always pass.
pub fn roll<R: Rng>(rng: &mut R, chance: f64) -> bool {
    if !chance.is_finite() || chance <= 0.0 {
        return false;
    }
    if chance >= 1.0 {
        return true;
    }
    rng.gen_bool(chance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn content_words_drop_short_and_stop_words() {
        let words = content_words("I keep thinking about the Garden, and my mother's hands.");
        assert!(words.contains("thinking"));
        assert!(words.contains("garden"));
        assert!(words.contains("mother's"));
        assert!(words.contains("hands"));
        assert!(!words.contains("about"));
        assert!(!words.contains("the"));
    }

    #[test]
    fn overlap_counts_shared_words() {
        let a = content_words("the garden was quiet this morning");
        let b = content_words("a quiet garden again");
        assert_eq!(overlap(&a, &b), 2);
    }

    #[test]
    fn sentences_split_on_terminal_punctuation() {
        let s = sentences("First one. Second one?! Third line\nFourth");
        assert_eq!(s, vec!["First one.", "Second one?!", "Third line", "Fourth"]);
    }

    #[test]
    fn sentences_handle_cjk_punctuation() {
        let s = sentences("今日は雨。明日は晴れ！");
        assert_eq!(s, vec!["今日は雨。", "明日は晴れ！"]);
    }

    #[test]
    fn roll_edges_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!roll(&mut rng, 0.0));
        assert!(!roll(&mut rng, -1.0));
        assert!(!roll(&mut rng, f64::NAN));
        assert!(roll(&mut rng, 1.0));
        assert!(roll(&mut rng, 2.0));
    }

    #[test]
    fn roll_is_reproducible_for_a_seed() {
        let a: Vec<bool> = {
            let mut rng = StdRng::seed_from_u64(9);
            (0..32).map(|_| roll(&mut rng, 0.5)).collect()
        };
        let b: Vec<bool> = {
            let mut rng = StdRng::seed_from_u64(9);
            (0..32).map(|_| roll(&mut rng, 0.5)).collect()
        };
        assert_eq!(a, b);
    }
}
