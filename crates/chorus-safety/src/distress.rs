// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic, cooldown-gated emotion and distress classification.
//!
//! Runs fire-and-forget next to the orchestration cycle. A classifier
//! failure skips that update and never reaches the writer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chorus_core::{EmotionClassifier, EmotionReading};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::grounding::{GroundingController, GroundingTrigger};

/// Per-check settings read from the current config snapshot.
#[derive(Debug, Clone, Copy)]
pub struct DistressPolicy {
    /// Whether a high reading may activate grounding.
    pub emergency_grounding: bool,
    /// Distress level at or above which grounding activates.
    pub threshold: u8,
}

pub struct DistressMonitor {
    classifier: Arc<dyn EmotionClassifier>,
    grounding: GroundingController,
    cooldown: Duration,
    last_check: Mutex<Option<Instant>>,
}

impl DistressMonitor {
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        grounding: GroundingController,
        cooldown: Duration,
    ) -> Self {
        Self {
            classifier,
            grounding,
            cooldown,
            last_check: Mutex::new(None),
        }
    }

    /// Claim the next check slot if the cooldown has elapsed.
    pub fn try_claim(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last_check.lock().unwrap_or_else(|e| e.into_inner());
        match *last {
            Some(at) if now.duration_since(at) < self.cooldown => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Classify `text` and apply the grounding policy.
    ///
    /// Returns `None` when the classifier fails.
    pub async fn check(&self, text: &str, policy: DistressPolicy) -> Option<EmotionReading> {
        let reading = match self.classifier.classify(text).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, "distress check failed, skipping");
                return None;
            }
        };
        debug!(
            emotion = %reading.emotion,
            distress = reading.distress_level,
            "emotion classified"
        );
        if policy.emergency_grounding && reading.distress_level >= policy.threshold {
            self.grounding.activate(GroundingTrigger::Distress {
                level: reading.distress_level,
            });
        }
        Some(reading)
    }

    /// Run a check in the background if the cooldown allows one.
    ///
    /// `on_reading` receives a successful reading.
    pub fn spawn_check<F>(
        self: &Arc<Self>,
        text: String,
        policy: DistressPolicy,
        on_reading: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(EmotionReading) + Send + 'static,
    {
        if !self.try_claim() {
            return None;
        }
        let monitor = Arc::clone(self);
        Some(tokio::spawn(async move {
            if let Some(reading) = monitor.check(&text, policy).await {
                on_reading(reading);
            }
        }))
    }
}
