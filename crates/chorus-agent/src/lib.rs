// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session orchestration for the Chorus part engine.
//!
//! An [`Orchestrator`] is built once per writing session with its injected
//! collaborators and owns every piece of per-session state: recent
//! speakers, the busy flag, the grounding controller, and the memory cache.

pub mod memory_cache;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use memory_cache::SessionMemoryCache;
pub use orchestrator::{
    Collaborators, CycleOutcome, Orchestrator, SkipReason, observer_marker_key,
};
pub use session::{CyclePhase, RecentSpeakers, SessionState};
