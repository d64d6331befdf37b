// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ancillary suggestion engines for the Chorus orchestration engine.
//!
//! Each engine is gated by a feature flag and a probability roll, searches a
//! bounded window of history, and returns at most one result. Store errors
//! are logged and treated as "no suggestion"; an engine never fails the
//! cycle it runs in.

pub mod disagreement;
pub mod echo;
pub mod fragment;
pub mod quiet;
pub mod quote;
pub mod ritual;
pub mod silence;
pub mod text;
pub mod thread;

pub use disagreement::DisagreementEngine;
pub use echo::EchoEngine;
pub use fragment::PastFragment;
pub use quiet::QuietTracker;
pub use quote::QuoteEngine;
pub use ritual::{RitualEngine, RitualKind, RitualPattern, detect_rituals};
pub use silence::SilenceEngine;
pub use thread::{ThreadEngine, ThreadSource, ThreadSuggestion};
