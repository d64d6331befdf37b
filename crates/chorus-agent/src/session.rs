// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory state for one writing session.

use std::fmt;
use std::time::Duration;

use chorus_core::EmotionTag;
use tokio::time::Instant;

/// How many recent speakers the recency penalty looks at.
pub const RECENT_SPEAKERS_CAPACITY: usize = 3;

/// Bounded list of persona ids, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentSpeakers {
    ids: Vec<String>,
}

impl RecentSpeakers {
    pub fn push(&mut self, part_id: impl Into<String>) {
        self.ids.insert(0, part_id.into());
        self.ids.truncate(RECENT_SPEAKERS_CAPACITY);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    pub fn latest(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Where the orchestrator is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    /// Safety screen and engine short-circuits.
    Screening,
    /// Enrichment lookups and persona scoring.
    Scoring,
    /// Streaming the selected persona's thought.
    Generating,
    /// Waiting for or streaming a disagreement.
    FollowUp,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePhase::Idle => write!(f, "idle"),
            CyclePhase::Screening => write!(f, "screening"),
            CyclePhase::Scoring => write!(f, "scoring"),
            CyclePhase::Generating => write!(f, "generating"),
            CyclePhase::FollowUp => write!(f, "follow_up"),
        }
    }
}

#[derive(Debug)]
pub struct SessionState {
    pub recent_speakers: RecentSpeakers,
    /// Refreshed by the periodic emotion check, not per pause.
    pub current_emotion: Option<EmotionTag>,
    pub intention: Option<String>,
    pub echoes_shown: usize,
    /// Start of the current stretch of writing without a persona thought.
    pub flow_since: Instant,
    pub phase: CyclePhase,
}

impl SessionState {
    pub fn new(now: Instant) -> Self {
        Self {
            recent_speakers: RecentSpeakers::default(),
            current_emotion: None,
            intention: None,
            echoes_shown: 0,
            flow_since: now,
            phase: CyclePhase::Idle,
        }
    }

    pub fn flow(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.flow_since)
    }

    /// A persona spoke: it becomes the latest speaker and flow restarts.
    pub fn record_thought(&mut self, part_id: &str, now: Instant) {
        self.recent_speakers.push(part_id);
        self.flow_since = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_speakers_are_bounded_and_most_recent_first() {
        let mut recent = RecentSpeakers::default();
        for id in ["a", "b", "c", "d"] {
            recent.push(id);
        }
        assert_eq!(recent.as_slice(), &["d", "c", "b"]);
        assert_eq!(recent.latest(), Some("d"));
        assert_eq!(recent.len(), RECENT_SPEAKERS_CAPACITY);
    }

    #[test]
    fn repeat_speaker_occupies_two_slots() {
        let mut recent = RecentSpeakers::default();
        recent.push("a");
        recent.push("a");
        assert_eq!(recent.as_slice(), &["a", "a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn thought_restarts_flow() {
        let mut state = SessionState::new(Instant::now());
        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(state.flow(Instant::now()), Duration::from_secs(120));
        state.record_thought("a", Instant::now());
        assert_eq!(state.flow(Instant::now()), Duration::ZERO);
        assert_eq!(state.recent_speakers.latest(), Some("a"));
    }

    #[test]
    fn phase_display() {
        assert_eq!(CyclePhase::FollowUp.to_string(), "follow_up");
    }
}
