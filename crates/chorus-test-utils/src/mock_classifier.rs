// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock emotion classifier.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chorus_core::{ChorusError, EmotionClassifier, EmotionReading, EmotionTag};

enum Behavior {
    Fixed(EmotionReading),
    Failing(String),
}

/// Returns the same reading (or the same error) for every call.
pub struct MockClassifier {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn fixed(emotion: EmotionTag, distress_level: u8) -> Self {
        Self {
            behavior: Behavior::Fixed(EmotionReading {
                emotion,
                distress_level,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            behavior: Behavior::Failing(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A calm reading that never triggers grounding.
    pub fn calm() -> Self {
        Self::fixed(EmotionTag::Neutral, 0)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmotionClassifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<EmotionReading, ChorusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Fixed(reading) => Ok(*reading),
            Behavior::Failing(message) => Err(ChorusError::Classifier {
                message: message.clone(),
                source: None,
            }),
        }
    }
}
