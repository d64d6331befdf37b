// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming generation for the Chorus orchestration engine.
//!
//! The demultiplexer is a plain push-based state machine so it can be tested
//! without a runtime; the coordinator drives it from a provider's token
//! stream and finalizes the persisted thought.

pub mod annotations;
pub mod capitalization;
pub mod coordinator;
pub mod demux;

pub use annotations::{AnnotationLimits, parse_annotations};
pub use capitalization::fix_ghost_capitalization;
pub use coordinator::{GenerationCoordinator, GenerationJob, GenerationKind, GenerationResult};
pub use demux::{ANNOTATION_DELIMITER, AnnotationDemux, DemuxOutput, DemuxState};
