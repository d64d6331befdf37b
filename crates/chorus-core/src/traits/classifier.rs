// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emotion and distress classification.

use async_trait::async_trait;

use crate::error::ChorusError;
use crate::types::EmotionReading;

/// Classifies the emotional tone and distress level of a text window.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<EmotionReading, ChorusError>;
}
