// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by every Chorus crate.
//!
//! Enumerations are closed sets: the five part roles, the eight pause types,
//! and the ten emotion tags are fixed categories, so lookups keyed by them
//! are exhaustive matches rather than string maps.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The archetypal function a part plays in the writer's inner system.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PartRole {
    /// Guards against vulnerability before it surfaces.
    Protector,
    /// Carries old pain and tenderness.
    Exile,
    /// Plans, organizes, keeps things under control.
    Manager,
    /// Reacts fast to douse overwhelming feelings.
    Firefighter,
    /// The calm, curious center. Serialized as `self`.
    #[strum(serialize = "self")]
    #[serde(rename = "self")]
    SelfEnergy,
}

/// Classified writing pause produced by the host's cadence detector.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PauseType {
    ShortPause,
    SentenceComplete,
    CadenceSlowdown,
    ParagraphBreak,
    LongPause,
    Ellipsis,
    Question,
    TrailingOff,
}

impl PauseType {
    /// Pause types that suggest the writer may be stepping around something.
    pub fn is_avoidance_relevant(self) -> bool {
        matches!(
            self,
            PauseType::TrailingOff
                | PauseType::Ellipsis
                | PauseType::LongPause
                | PauseType::CadenceSlowdown
        )
    }
}

/// Emotional tone of the writing, as reported by the classifier.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmotionTag {
    #[default]
    Neutral,
    Tender,
    Anxious,
    Angry,
    Sad,
    Joyful,
    Contemplative,
    Fearful,
    Hopeful,
    Conflicted,
}

/// A single writing pause, consumed once per orchestration cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseEvent {
    #[serde(rename = "type")]
    pub pause_type: PauseType,
    /// How long the writer has been idle, in milliseconds.
    pub duration_ms: u64,
    /// Full text of the current entry.
    pub current_text: String,
    /// Tail window of text near the cursor.
    pub recent_text: String,
    pub cursor_position: usize,
    pub timestamp: DateTime<Utc>,
}

impl PauseEvent {
    /// Build an event at `Utc::now()` whose recent window is the whole text.
    pub fn new(pause_type: PauseType, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            pause_type,
            duration_ms: 0,
            cursor_position: text.chars().count(),
            recent_text: text.clone(),
            current_text: text,
            timestamp: Utc::now(),
        }
    }
}

/// A persona: static definition plus learned attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub color: String,
    pub color_light: String,
    pub role: PartRole,
    /// How the part speaks.
    pub voice: String,
    /// What the part worries about; words longer than three characters feed relevance scoring.
    pub concern: String,
    /// Persona-specific system prompt template.
    pub system_prompt: String,
    #[serde(default)]
    pub learned_keywords: BTreeSet<String>,
    #[serde(default)]
    pub learned_emotions: BTreeSet<EmotionTag>,
    #[serde(default)]
    pub catchphrases: Vec<String>,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    /// Set when the part went quiet; cleared when it speaks again.
    #[serde(default)]
    pub quiet_since: Option<DateTime<Utc>>,
}

impl Persona {
    /// Create a persona with empty voice, prompt and learned state.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: PartRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: "#888888".to_string(),
            color_light: "#88888822".to_string(),
            role,
            voice: String::new(),
            concern: String::new(),
            system_prompt: String::new(),
            learned_keywords: BTreeSet::new(),
            learned_emotions: BTreeSet::new(),
            catchphrases: Vec::new(),
            last_active_at: None,
            quiet_since: None,
        }
    }

    /// Lowercased words from `concern` longer than three characters.
    pub fn concern_tokens(&self) -> Vec<String> {
        self.concern
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| w.chars().count() > 3)
            .map(str::to_lowercase)
            .collect()
    }
}

/// Kind of a stored part memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Reflection,
    Pattern,
    Interaction,
    Observation,
    /// Rows written before memories carried a type.
    Untyped,
}

impl MemoryKind {
    /// Convert to string for SQLite storage. `Untyped` is stored as NULL.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            MemoryKind::Reflection => Some("reflection"),
            MemoryKind::Pattern => Some("pattern"),
            MemoryKind::Interaction => Some("interaction"),
            MemoryKind::Observation => Some("observation"),
            MemoryKind::Untyped => None,
        }
    }

    /// Parse from a nullable SQLite column.
    pub fn from_str_value(s: Option<&str>) -> Self {
        match s {
            Some("reflection") => MemoryKind::Reflection,
            Some("pattern") => MemoryKind::Pattern,
            Some("interaction") => MemoryKind::Interaction,
            Some("observation") => MemoryKind::Observation,
            _ => MemoryKind::Untyped,
        }
    }
}

/// Append-only memory attached to a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartMemory {
    pub id: String,
    pub part_id: String,
    pub entry_id: String,
    pub content: String,
    pub kind: MemoryKind,
    pub timestamp: DateTime<Utc>,
}

/// The persisted result of one successful generation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartThought {
    pub id: String,
    pub part_id: String,
    pub entry_id: String,
    /// Visible text with the annotation side-channel stripped.
    pub content: String,
    pub anchor_text: String,
    pub anchor_offset: usize,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_disagreement: bool,
    #[serde(default)]
    pub responding_to_part_id: Option<String>,
}

/// Structured side-channel payload parsed from a generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub highlights: Vec<String>,
    pub ghost_text: Option<String>,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty() && self.ghost_text.is_none()
    }
}

/// A stored journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    /// Plain text of the entry.
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Reflection summary written for a completed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: String,
    pub entry_id: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub emotional_arc: Option<String>,
    #[serde(default)]
    pub key_moments: Vec<String>,
    #[serde(default)]
    pub unresolved_threads: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Coarse time-of-day bucket for ritual detection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 05:00–07:59
    EarlyMorning,
    /// 08:00–11:59
    Morning,
    /// 12:00–16:59
    Afternoon,
    /// 17:00–20:59
    Evening,
    /// 21:00–23:59
    Night,
    /// 00:00–04:59
    LateNight,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=7 => TimeOfDay::EarlyMorning,
            8..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            21..=23 => TimeOfDay::Night,
            _ => TimeOfDay::LateNight,
        }
    }
}

/// One writing session, as logged by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    pub id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    pub word_count: u32,
    pub time_of_day: TimeOfDay,
    pub day_of_week: Weekday,
}

impl SessionLog {
    /// Build a log whose buckets are derived from `started_at`.
    pub fn starting_at(id: impl Into<String>, started_at: DateTime<Utc>, word_count: u32) -> Self {
        Self {
            id: id.into(),
            started_at,
            ended_at: None,
            word_count,
            time_of_day: TimeOfDay::from_hour(started_at.hour()),
            day_of_week: started_at.weekday(),
        }
    }
}

/// Long-term profile of the writer, maintained by an external reflection process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub recurring_themes: Vec<String>,
    #[serde(default)]
    pub emotional_patterns: Vec<String>,
    /// Topics or phrasings the writer tends to circle around without addressing.
    #[serde(default)]
    pub avoidance_patterns: Vec<String>,
    #[serde(default)]
    pub growth_signals: Vec<String>,
    #[serde(default)]
    pub inner_landscape: Option<String>,
}

/// Role tag on a generation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A streaming generation request handed to the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// Result of the emotion/distress classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionReading {
    pub emotion: EmotionTag,
    /// 0 (none) to 5 (acute).
    pub distress_level: u8,
}

/// A past fragment surfaced directly to the writer instead of a part response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoPayload {
    pub entry_id: String,
    pub fragment: String,
    pub written_at: DateTime<Utc>,
    pub days_ago: i64,
}

/// A part that deliberately stays quiet while the writer is in flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilencePayload {
    pub part_id: String,
    pub name: String,
    pub color: String,
    pub color_light: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn self_role_serializes_as_self() {
        assert_eq!(PartRole::SelfEnergy.to_string(), "self");
        assert_eq!(PartRole::from_str("self").unwrap(), PartRole::SelfEnergy);
        let json = serde_json::to_string(&PartRole::SelfEnergy).unwrap();
        assert_eq!(json, "\"self\"");
    }

    #[test]
    fn pause_types_round_trip_through_strings() {
        assert_eq!(PauseType::iter().count(), 8);
        for p in PauseType::iter() {
            assert_eq!(PauseType::from_str(&p.to_string()).unwrap(), p);
        }
        assert_eq!(PauseType::TrailingOff.to_string(), "trailing_off");
    }

    #[test]
    fn emotion_tags_are_a_closed_set_of_ten() {
        assert_eq!(EmotionTag::iter().count(), 10);
        assert_eq!(EmotionTag::default(), EmotionTag::Neutral);
    }

    #[test]
    fn avoidance_relevant_pauses() {
        let relevant: Vec<_> = PauseType::iter().filter(|p| p.is_avoidance_relevant()).collect();
        assert_eq!(
            relevant,
            vec![
                PauseType::CadenceSlowdown,
                PauseType::LongPause,
                PauseType::Ellipsis,
                PauseType::TrailingOff
            ]
        );
    }

    #[test]
    fn concern_tokens_drop_short_words() {
        let mut p = Persona::new("w", "Watcher", PartRole::Protector);
        p.concern = "Keeps you safe from being hurt or exposed".to_string();
        assert_eq!(
            p.concern_tokens(),
            vec!["keeps", "safe", "from", "being", "hurt", "exposed"]
        );
    }

    #[test]
    fn memory_kind_untyped_maps_to_null() {
        assert_eq!(MemoryKind::Untyped.as_str(), None);
        assert_eq!(MemoryKind::from_str_value(None), MemoryKind::Untyped);
        assert_eq!(
            MemoryKind::from_str_value(Some("observation")),
            MemoryKind::Observation
        );
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::EarlyMorning);
        assert_eq!(TimeOfDay::from_hour(9), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(13), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(2), TimeOfDay::LateNight);
    }

    #[test]
    fn pause_event_deserializes_type_field() {
        let json = r#"{"type":"long_pause","duration_ms":4000,"current_text":"abc","recent_text":"abc","cursor_position":3,"timestamp":"2026-01-01T00:00:00Z"}"#;
        let event: PauseEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.pause_type, PauseType::LongPause);
        assert_eq!(event.duration_ms, 4000);
    }
}
