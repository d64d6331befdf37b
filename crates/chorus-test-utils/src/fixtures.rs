// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test data: a six-part roster and builders for history records.

use chorus_config::ChorusConfig;
use chorus_core::{Entry, EntrySummary, PartRole, PauseEvent, PauseType, Persona, SessionLog};
use chrono::{DateTime, Duration, Utc};

fn persona(id: &str, name: &str, role: PartRole, color: &str, concern: &str) -> Persona {
    let mut p = Persona::new(id, name, role);
    p.color = color.to_string();
    p.color_light = format!("{color}22");
    p.concern = concern.to_string();
    p.voice = format!("{name} speaks plainly.");
    p
}

/// One persona per role, plus the quiet observer ("watcher").
pub fn roster() -> Vec<Persona> {
    vec![
        persona(
            "guardian",
            "Guardian",
            PartRole::Protector,
            "#5B7DB1",
            "keeping the writer safe from exposure",
        ),
        persona(
            "small-one",
            "Small One",
            PartRole::Exile,
            "#C97B84",
            "being left alone and forgotten",
        ),
        persona(
            "planner",
            "Planner",
            PartRole::Manager,
            "#7A9E7E",
            "deadlines, lists and getting things done",
        ),
        persona(
            "spark",
            "Spark",
            PartRole::Firefighter,
            "#E07A3F",
            "escaping when feelings get too loud",
        ),
        persona(
            "center",
            "Center",
            PartRole::SelfEnergy,
            "#B8A04A",
            "curiosity and calm attention",
        ),
        persona(
            "watcher",
            "Watcher",
            PartRole::Protector,
            "#6E6E8F",
            "patterns that repeat across entries",
        ),
    ]
}

/// Config with persona responses on, every optional feature off, and a
/// fixed seed.
pub fn config() -> ChorusConfig {
    let mut config = ChorusConfig::default();
    config.features.part_responses = true;
    config.agent.seed = Some(7);
    config
}

pub fn pause(pause_type: PauseType, text: &str) -> PauseEvent {
    PauseEvent::new(pause_type, text)
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

pub fn entry(id: &str, content: &str, age_days: i64) -> Entry {
    Entry {
        id: id.to_string(),
        content: content.to_string(),
        created_at: days_ago(age_days),
    }
}

pub fn summary(entry_id: &str, age_days: i64, unresolved: &[&str]) -> EntrySummary {
    EntrySummary {
        id: format!("summary-{entry_id}"),
        entry_id: entry_id.to_string(),
        themes: Vec::new(),
        emotional_arc: None,
        key_moments: Vec::new(),
        unresolved_threads: unresolved.iter().map(|s| s.to_string()).collect(),
        created_at: days_ago(age_days),
    }
}

pub fn session_log(id: &str, started_at: DateTime<Utc>, word_count: u32) -> SessionLog {
    SessionLog::starting_at(id, started_at, word_count)
}
