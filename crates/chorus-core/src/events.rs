// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events emitted from the engine to the host UI.

use serde::{Deserialize, Serialize};

use crate::types::{Annotation, EchoPayload, EmotionTag, PartThought, SilencePayload};

/// One event on the engine-to-host channel.
///
/// For a single cycle the ordering is: `EmotionDetected` (optional),
/// `ThoughtStart`, zero or more `ThoughtToken`, then `ThoughtComplete`
/// followed by an optional `Annotations`. An `Error` replaces the completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum HostEvent {
    ThoughtStart {
        part_id: String,
        name: String,
        color: String,
    },
    /// Visible token text. Never contains side-channel content.
    ThoughtToken(String),
    ThoughtComplete(PartThought),
    EmotionDetected(EmotionTag),
    Error(String),
    Annotations {
        annotation: Annotation,
        color: String,
    },
    Echo(EchoPayload),
    Silence(SilencePayload),
    DisagreementStart {
        part_id: String,
        name: String,
        color: String,
        responding_to_part_id: String,
    },
    DisagreementToken(String),
    DisagreementComplete(PartThought),
    GroundingChanged {
        active: bool,
    },
}

impl HostEvent {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::ThoughtStart { .. } => "thought_start",
            HostEvent::ThoughtToken(_) => "thought_token",
            HostEvent::ThoughtComplete(_) => "thought_complete",
            HostEvent::EmotionDetected(_) => "emotion_detected",
            HostEvent::Error(_) => "error",
            HostEvent::Annotations { .. } => "annotations",
            HostEvent::Echo(_) => "echo",
            HostEvent::Silence(_) => "silence",
            HostEvent::DisagreementStart { .. } => "disagreement_start",
            HostEvent::DisagreementToken(_) => "disagreement_token",
            HostEvent::DisagreementComplete(_) => "disagreement_complete",
            HostEvent::GroundingChanged { .. } => "grounding_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(HostEvent::GroundingChanged { active: true }).unwrap();
        assert_eq!(json["type"], "grounding_changed");
        assert_eq!(json["data"]["active"], true);
    }

    #[test]
    fn token_events_serialize() {
        let json = serde_json::to_value(HostEvent::ThoughtToken("hi".into())).unwrap();
        assert_eq!(json["type"], "thought_token");
        assert_eq!(json["data"], "hi");
    }

    #[test]
    fn kind_matches_serde_tag() {
        let event = HostEvent::ThoughtStart {
            part_id: "p".into(),
            name: "P".into(),
            color: "#000".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
    }
}
