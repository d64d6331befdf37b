// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs one streamed generation from start event to persisted thought.
//!
//! Tokens are forwarded to the host as they arrive, minus any annotation
//! payload. A transport error or a cancellation ends the run with nothing
//! persisted. Only a complete, non-empty response becomes a `PartThought`;
//! an empty one ends the run quietly, as if the persona had nothing to say.

use std::sync::Arc;

use chorus_core::{
    Annotation, ChorusError, EventSink, GenerationProvider, GenerationRequest, HostEvent,
    PartStore, PartThought, Persona,
};
use chrono::Utc;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::annotations::{AnnotationLimits, parse_annotations};
use crate::capitalization::fix_ghost_capitalization;
use crate::demux::AnnotationDemux;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationKind {
    Thought,
    /// A follow-up pushing back on another persona's thought.
    Disagreement { responding_to: String },
}

/// Everything one generation needs.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub speaker: Persona,
    pub entry_id: String,
    pub anchor_text: String,
    pub anchor_offset: usize,
    /// The writer's text before the cursor, for ghost-text capitalization.
    pub preceding_text: String,
    pub request: GenerationRequest,
    /// `None` disables the annotation side channel for this turn.
    pub annotations: Option<AnnotationLimits>,
    pub kind: GenerationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub thought: PartThought,
    pub annotation: Option<Annotation>,
}

pub struct GenerationCoordinator {
    provider: Arc<dyn GenerationProvider>,
    store: Arc<dyn PartStore>,
    sink: Arc<dyn EventSink>,
}

impl GenerationCoordinator {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        store: Arc<dyn PartStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            provider,
            store,
            sink,
        }
    }

    fn start_event(job: &GenerationJob) -> HostEvent {
        let speaker = &job.speaker;
        match &job.kind {
            GenerationKind::Thought => HostEvent::ThoughtStart {
                part_id: speaker.id.clone(),
                name: speaker.name.clone(),
                color: speaker.color.clone(),
            },
            GenerationKind::Disagreement { responding_to } => HostEvent::DisagreementStart {
                part_id: speaker.id.clone(),
                name: speaker.name.clone(),
                color: speaker.color.clone(),
                responding_to_part_id: responding_to.clone(),
            },
        }
    }

    fn emit_token(&self, kind: &GenerationKind, text: String) {
        if text.is_empty() {
            return;
        }
        self.sink.emit(match kind {
            GenerationKind::Thought => HostEvent::ThoughtToken(text),
            GenerationKind::Disagreement { .. } => HostEvent::DisagreementToken(text),
        });
    }

    fn fail(&self, part_id: &str, err: ChorusError) -> ChorusError {
        warn!(part_id, error = %err, "generation failed");
        self.sink.emit(HostEvent::Error(err.to_string()));
        err
    }

    /// Run `job` to completion, or until `cancel` fires.
    ///
    /// Returns `Ok(None)` when the model produced no visible text, and
    /// [`ChorusError::Cancelled`] on cancellation. Neither emits an error event.
    pub async fn run(
        &self,
        job: GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<Option<GenerationResult>, ChorusError> {
        let part_id = job.speaker.id.as_str();
        self.sink.emit(Self::start_event(&job));
        debug!(part_id, kind = ?job.kind, "generation started");

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ChorusError::Cancelled),
            opened = self.provider.stream(job.request.clone()) => opened,
        };
        let mut stream = opened.map_err(|e| self.fail(part_id, e))?;

        let mut demux = AnnotationDemux::new(job.annotations.is_some());
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(part_id, "generation cancelled");
                    return Err(ChorusError::Cancelled);
                }
                next = stream.next() => next,
            };
            match next {
                Some(Ok(chunk)) => {
                    let shown = demux.push(&chunk);
                    self.emit_token(&job.kind, shown);
                }
                Some(Err(e)) => return Err(self.fail(part_id, e)),
                None => break,
            }
        }

        let output = demux.finish();
        self.emit_token(&job.kind, output.tail);

        let content = output.display.trim();
        if content.is_empty() {
            debug!(part_id, "empty response, nothing to persist");
            return Ok(None);
        }

        let responding_to = match &job.kind {
            GenerationKind::Thought => None,
            GenerationKind::Disagreement { responding_to } => Some(responding_to.clone()),
        };
        let thought = PartThought {
            id: uuid::Uuid::new_v4().to_string(),
            part_id: job.speaker.id.clone(),
            entry_id: job.entry_id.clone(),
            content: content.to_string(),
            anchor_text: job.anchor_text.clone(),
            anchor_offset: job.anchor_offset,
            timestamp: Utc::now(),
            is_disagreement: responding_to.is_some(),
            responding_to_part_id: responding_to,
        };

        self.store
            .append_thought(&thought)
            .await
            .map_err(|e| self.fail(part_id, e))?;

        self.sink.emit(match job.kind {
            GenerationKind::Thought => HostEvent::ThoughtComplete(thought.clone()),
            GenerationKind::Disagreement { .. } => HostEvent::DisagreementComplete(thought.clone()),
        });

        let annotation = match (job.annotations, output.payload) {
            (Some(limits), Some(payload)) => parse_annotations(&payload, limits),
            _ => None,
        }
        .map(|mut a| {
            a.ghost_text = a
                .ghost_text
                .map(|g| fix_ghost_capitalization(&g, &job.preceding_text));
            a
        });
        if let Some(a) = &annotation {
            self.sink.emit(HostEvent::Annotations {
                annotation: a.clone(),
                color: job.speaker.color.clone(),
            });
        }

        info!(
            part_id,
            chars = thought.content.chars().count(),
            annotated = annotation.is_some(),
            "thought complete"
        );
        Ok(Some(GenerationResult {
            thought,
            annotation,
        }))
    }
}
