// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed per-role lookup tables: keywords, emotional affinities, and
//! pause-type affinity.
//!
//! Keyed by the closed [`PartRole`] enum, so every role has an entry.

use chorus_core::{EmotionTag, PartRole, PauseType};

/// Affinity for any `(role, pause)` pair the table leaves unspecified.
pub const DEFAULT_PAUSE_AFFINITY: f64 = 10.0;

const PROTECTOR_KEYWORDS: &[&str] = &[
    "careful", "safe", "worry", "risk", "protect", "afraid", "danger", "trust", "guard", "hurt",
];

const EXILE_KEYWORDS: &[&str] = &[
    "alone", "lonely", "remember", "child", "miss", "lost", "abandoned", "cry", "small",
    "unloved",
];

const MANAGER_KEYWORDS: &[&str] = &[
    "should", "plan", "need", "must", "control", "deadline", "list", "organize", "schedule",
    "work",
];

const FIREFIGHTER_KEYWORDS: &[&str] = &[
    "escape", "numb", "distract", "angry", "enough", "scroll", "drink", "overwhelm", "stop",
    "hate",
];

const SELF_KEYWORDS: &[&str] = &[
    "notice", "curious", "feel", "breathe", "accept", "calm", "understand", "compassion",
    "wonder", "gentle",
];

/// Role-level keywords matched against the recent text.
pub fn role_keywords(role: PartRole) -> &'static [&'static str] {
    match role {
        PartRole::Protector => PROTECTOR_KEYWORDS,
        PartRole::Exile => EXILE_KEYWORDS,
        PartRole::Manager => MANAGER_KEYWORDS,
        PartRole::Firefighter => FIREFIGHTER_KEYWORDS,
        PartRole::SelfEnergy => SELF_KEYWORDS,
    }
}

/// Emotions a role is drawn to.
pub fn role_emotions(role: PartRole) -> &'static [EmotionTag] {
    match role {
        PartRole::Protector => &[EmotionTag::Anxious, EmotionTag::Fearful],
        PartRole::Exile => &[EmotionTag::Sad, EmotionTag::Tender, EmotionTag::Fearful],
        PartRole::Manager => &[EmotionTag::Anxious, EmotionTag::Conflicted],
        PartRole::Firefighter => &[EmotionTag::Angry, EmotionTag::Conflicted],
        PartRole::SelfEnergy => &[
            EmotionTag::Contemplative,
            EmotionTag::Hopeful,
            EmotionTag::Joyful,
        ],
    }
}

/// How strongly a role is drawn to speak at a given pause type, in `[5, 25]`.
pub fn pause_affinity(role: PartRole, pause: PauseType) -> f64 {
    use PartRole::*;
    use PauseType::*;

    match (role, pause) {
        (Protector, LongPause | TrailingOff) => 20.0,
        (Protector, Ellipsis | CadenceSlowdown) => 15.0,
        (Protector, ShortPause | SentenceComplete) => 5.0,

        (Exile, TrailingOff) => 25.0,
        (Exile, Ellipsis) => 20.0,
        (Exile, LongPause | ParagraphBreak) => 15.0,
        (Exile, ShortPause | SentenceComplete) => 5.0,

        (Manager, SentenceComplete | ParagraphBreak) => 20.0,
        (Manager, Question) => 15.0,
        (Manager, TrailingOff | Ellipsis | LongPause) => 5.0,

        (Firefighter, ShortPause | CadenceSlowdown) => 20.0,
        (Firefighter, Question) => 15.0,
        (Firefighter, ParagraphBreak | LongPause) => 5.0,

        (SelfEnergy, ParagraphBreak) => 25.0,
        (SelfEnergy, Question) => 20.0,
        (SelfEnergy, LongPause | SentenceComplete) => 15.0,
        (SelfEnergy, ShortPause) => 5.0,

        _ => DEFAULT_PAUSE_AFFINITY,
    }
}
