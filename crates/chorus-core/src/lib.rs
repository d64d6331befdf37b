// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Chorus part orchestration engine.
//!
//! This crate provides the domain types, the shared error type, the host
//! event enum, and the collaborator traits (generation, classification,
//! storage, event sink) that the engine is injected with.

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

pub use error::ChorusError;
pub use events::HostEvent;
pub use traits::{EmotionClassifier, EventSink, GenerationProvider, PartStore, TokenStream};
pub use types::{
    Annotation, ChatMessage, ChatRole, EchoPayload, EmotionReading, EmotionTag, Entry,
    EntrySummary, GenerationRequest, MemoryKind, PartMemory, PartRole, PartThought, PauseEvent,
    PauseType, Persona, SessionLog, SilencePayload, TimeOfDay, UserProfile,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chorus_error_has_all_variants() {
        let _config = ChorusError::Config("test".into());
        let _storage = ChorusError::storage(std::io::Error::other("test"));
        let _provider = ChorusError::provider("test");
        let _classifier = ChorusError::Classifier {
            message: "test".into(),
            source: None,
        };
        let _not_found = ChorusError::NotFound {
            kind: "entry",
            id: "e1".into(),
        };
        let _cancelled = ChorusError::Cancelled;
        let _timeout = ChorusError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = ChorusError::Internal("test".into());
    }

    #[test]
    fn transport_errors_are_classified() {
        assert!(ChorusError::provider("reset").is_transport());
        assert!(
            ChorusError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }
            .is_transport()
        );
        assert!(!ChorusError::Cancelled.is_transport());
    }

    #[test]
    fn error_display_is_readable() {
        let err = ChorusError::NotFound {
            kind: "entry",
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "entry not found: abc");
    }

    #[test]
    fn traits_are_object_safe() {
        fn _provider(_: &dyn GenerationProvider) {}
        fn _classifier(_: &dyn EmotionClassifier) {}
        fn _store(_: &dyn PartStore) {}
        fn _sink(_: &dyn EventSink) {}
    }
}
