// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end orchestration tests.
//!
//! `TestHarness` assembles an orchestrator over mock collaborators and an
//! in-memory store, already started, so tests can drive `handle_pause`
//! directly and assert on recorded events and persisted records.

use std::sync::Arc;

use chorus_agent::{Collaborators, Orchestrator};
use chorus_config::ChorusConfig;
use chorus_core::{ChorusError, PauseEvent};

use crate::fixtures;
use crate::memory_store::InMemoryStore;
use crate::mock_classifier::MockClassifier;
use crate::mock_provider::{MockProvider, Script};
use crate::sink::RecordingSink;

/// Entry id the harness session writes into.
pub const ENTRY_ID: &str = "entry-today";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: ChorusConfig,
    scripts: Vec<Script>,
    classifier: MockClassifier,
    store: Option<InMemoryStore>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: fixtures::config(),
            scripts: Vec::new(),
            classifier: MockClassifier::calm(),
            store: None,
        }
    }

    pub fn with_config(mut self, config: ChorusConfig) -> Self {
        self.config = config;
        self
    }

    /// Adjust the default config in place.
    pub fn configure(mut self, f: impl FnOnce(&mut ChorusConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn with_scripts(mut self, scripts: Vec<Script>) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn with_classifier(mut self, classifier: MockClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Use a prepared store. Defaults to one holding [`fixtures::roster`].
    pub fn with_store(mut self, store: InMemoryStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Build and start the orchestrator.
    pub async fn build(self) -> Result<TestHarness, ChorusError> {
        let provider = Arc::new(MockProvider::with_scripts(self.scripts));
        let classifier = Arc::new(self.classifier);
        let store = Arc::new(
            self.store
                .unwrap_or_else(|| InMemoryStore::with_parts(fixtures::roster())),
        );
        let sink = Arc::new(RecordingSink::new());

        let orchestrator = Arc::new(Orchestrator::new(
            self.config,
            Collaborators {
                provider: provider.clone(),
                classifier: classifier.clone(),
                store: store.clone(),
                sink: sink.clone(),
            },
            ENTRY_ID,
        ));
        orchestrator.start().await?;

        Ok(TestHarness {
            orchestrator,
            provider,
            classifier,
            store,
            sink,
        })
    }
}

/// A started orchestrator plus handles on each of its mock collaborators.
pub struct TestHarness {
    pub orchestrator: Arc<Orchestrator>,
    pub provider: Arc<MockProvider>,
    pub classifier: Arc<MockClassifier>,
    pub store: Arc<InMemoryStore>,
    pub sink: Arc<RecordingSink>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Drive one cycle.
    pub async fn pause(&self, event: PauseEvent) -> chorus_agent::CycleOutcome {
        self.orchestrator.handle_pause(event).await
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.orchestrator.shutdown();
    }
}
