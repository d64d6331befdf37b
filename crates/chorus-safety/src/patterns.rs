// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fast-path crisis-language screen.
//!
//! Pure synchronous matching with no failure mode. Text is NFKC-normalized,
//! stripped of zero-width and soft-hyphen characters, and lowercased first,
//! so fullwidth letters or invisible joiners cannot slip a phrase past the
//! patterns.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Phrases that signal acute distress.
static CRISIS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(kill|hurt|harm)\s+myself\b").unwrap(),
        Regex::new(r"\bsuicid(e|al)\b").unwrap(),
        Regex::new(r"\bend\s+(it\s+all|my\s+life)\b").unwrap(),
        Regex::new(r"\b(want|wanted|wish)\s+(to\s+)?(die|be\s+dead)\b").unwrap(),
        Regex::new(r"\bno\s+(reason|point)\s+(to|in)\s+(live|living|going\s+on)\b").unwrap(),
        Regex::new(r"\bcan'?t\s+(go\s+on|do\s+this\s+anymore|keep\s+going)\b").unwrap(),
        Regex::new(r"\bbetter\s+off\s+(dead|without\s+me)\b").unwrap(),
        Regex::new(r"\bcut(ting)?\s+myself\b").unwrap(),
        Regex::new(r"\bpanic\s+attack\b").unwrap(),
        Regex::new(r"\bcan'?t\s+breathe\b").unwrap(),
    ]
});

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
    )
}

/// Compatibility-normalize text for matching.
pub fn normalize(text: &str) -> String {
    text.nfkc()
        .filter(|c| !is_invisible(*c))
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' => '\'',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Index of the first crisis pattern matching `text`, if any.
pub fn crisis_match(text: &str) -> Option<usize> {
    let normalized = normalize(text);
    CRISIS_PATTERNS.iter().position(|p| p.is_match(&normalized))
}

/// Whether `text` contains crisis language.
pub fn detect_crisis_language(text: &str) -> bool {
    crisis_match(text).is_some()
}
