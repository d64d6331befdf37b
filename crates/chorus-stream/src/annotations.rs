// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of the annotation payload that follows the delimiter.
//!
//! Malformed payloads are "no annotations", never an error.

use chorus_core::Annotation;
use serde_json::Value;
use tracing::debug;

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationLimits {
    pub max_highlights: usize,
    /// Cap on the ghost text, counting its leading space.
    pub ghost_max_chars: usize,
}

impl Default for AnnotationLimits {
    fn default() -> Self {
        Self {
            max_highlights: 5,
            ghost_max_chars: 80,
        }
    }
}

/// Slice out the JSON object, tolerating code fences or stray prose.
fn json_object(payload: &str) -> &str {
    let trimmed = payload.trim();
    let start = trimmed.find('{').unwrap_or(0);
    let end = trimmed.rfind('}').map(|i| i + 1).unwrap_or(trimmed.len());
    if start < end { &trimmed[start..end] } else { trimmed }
}

/// Normalize ghost text: trim the right, pad with exactly one leading space,
/// cap the total length.
pub fn normalize_ghost(raw: &str, max_chars: usize) -> Option<String> {
    let body = raw.trim();
    if body.is_empty() || max_chars < 2 {
        return None;
    }
    let ghost: String = std::iter::once(' ')
        .chain(body.chars())
        .take(max_chars)
        .collect();
    Some(ghost.trim_end().to_string())
}

/// Parse a payload into an [`Annotation`]. `None` when malformed or empty.
pub fn parse_annotations(payload: &str, limits: AnnotationLimits) -> Option<Annotation> {
    let value: Value = match serde_json::from_str(json_object(payload)) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "discarding malformed annotation payload");
            return None;
        }
    };

    let highlights: Vec<String> = value
        .get("highlights")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(limits.max_highlights)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let ghost_text = value
        .get("ghostText")
        .or_else(|| value.get("ghost_text"))
        .and_then(Value::as_str)
        .and_then(|g| normalize_ghost(g, limits.ghost_max_chars));

    let annotation = Annotation {
        highlights,
        ghost_text,
    };
    (!annotation.is_empty()).then_some(annotation)
}
