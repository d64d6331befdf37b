// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Chorus integration tests.
//!
//! Provides scripted collaborators and a harness for fast, deterministic,
//! CI-runnable tests without a model or a database.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted token streams, with request capture
//! - [`MockClassifier`] - Fixed or failing emotion readings
//! - [`InMemoryStore`] - A `PartStore` backed by plain vectors
//! - [`RecordingSink`] - Captures every host event in order
//! - [`TestHarness`] - An orchestrator wired to all of the above

pub mod fixtures;
pub mod harness;
pub mod memory_store;
pub mod mock_classifier;
pub mod mock_provider;
pub mod sink;

pub use harness::{ENTRY_ID, TestHarness, TestHarnessBuilder};
pub use memory_store::InMemoryStore;
pub use mock_classifier::MockClassifier;
pub use mock_provider::{MockProvider, Script};
pub use sink::RecordingSink;
