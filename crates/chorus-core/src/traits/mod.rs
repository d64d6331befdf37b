// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the boundary of the orchestration engine.
//!
//! The engine never talks to a model, classifier, database, or UI directly.
//! Each of those is injected behind one of these traits and uses
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod classifier;
pub mod provider;
pub mod sink;
pub mod store;

pub use classifier::EmotionClassifier;
pub use provider::{GenerationProvider, TokenStream};
pub use sink::EventSink;
pub use store::PartStore;
