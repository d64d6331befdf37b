// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic persona scoring for the Chorus orchestration engine.
//!
//! Combines pause-type affinity, keyword relevance, emotional match,
//! recency, grounding, quiet-period and quiet-observer rules into one
//! explainable score per persona. No model call, no network.

pub mod cooldown;
pub mod scorer;
pub mod tables;

pub use cooldown::entries_since_marker;
pub use scorer::{HeuristicScorer, ScoreBreakdown, ScoreContext, keyword_set, select};
