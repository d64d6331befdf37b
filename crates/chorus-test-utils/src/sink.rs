// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event sink that records everything it is given.

use std::sync::{Mutex, PoisonError};

use chorus_core::{EventSink, HostEvent};

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event kinds in emission order, for sequence assertions.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(HostEvent::kind).collect()
    }

    /// Kinds with token events removed. Emotion readings are dropped too:
    /// they arrive from a background task at no fixed point in the cycle.
    pub fn milestones(&self) -> Vec<&'static str> {
        self.kinds()
            .into_iter()
            .filter(|k| !k.ends_with("_token") && *k != "emotion_detected")
            .collect()
    }

    /// Concatenated visible thought tokens.
    pub fn thought_text(&self) -> String {
        self.events()
            .iter()
            .filter_map(|e| match e {
                HostEvent::ThoughtToken(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .concat()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: HostEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
