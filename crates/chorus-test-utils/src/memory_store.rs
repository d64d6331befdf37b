// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `PartStore` for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chorus_core::{
    ChorusError, Entry, EntrySummary, PartMemory, PartStore, PartThought, Persona, SessionLog,
    UserProfile,
};
use chrono::{DateTime, Utc};

#[derive(Default)]
struct State {
    parts: Vec<Persona>,
    memories: Vec<PartMemory>,
    thoughts: Vec<PartThought>,
    entries: Vec<Entry>,
    summaries: Vec<EntrySummary>,
    session_logs: Vec<SessionLog>,
    markers: BTreeMap<String, String>,
    profile: Option<UserProfile>,
}

/// A `PartStore` over plain vectors, with a switch that makes every call fail.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    failing: AtomicBool,
}

fn newest_first<T, F>(items: &[T], limit: usize, key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| std::cmp::Reverse(key(item)));
    sorted.truncate(limit);
    sorted
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(parts: Vec<Persona>) -> Self {
        let store = Self::new();
        store.state().parts = parts;
        store
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), ChorusError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChorusError::storage(std::io::Error::other(
                "in-memory store set to fail",
            )));
        }
        Ok(())
    }

    /// Make every subsequent call return a storage error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn add_entry(&self, entry: Entry) {
        self.state().entries.push(entry);
    }

    pub fn add_summary(&self, summary: EntrySummary) {
        self.state().summaries.push(summary);
    }

    pub fn add_session_log(&self, log: SessionLog) {
        self.state().session_logs.push(log);
    }

    pub fn add_memory(&self, memory: PartMemory) {
        self.state().memories.push(memory);
    }

    pub fn set_profile(&self, profile: UserProfile) {
        self.state().profile = Some(profile);
    }

    pub fn put_marker(&self, key: &str, value: &str) {
        self.state().markers.insert(key.into(), value.into());
    }

    pub fn thoughts(&self) -> Vec<PartThought> {
        self.state().thoughts.clone()
    }

    pub fn memories(&self) -> Vec<PartMemory> {
        self.state().memories.clone()
    }

    pub fn marker(&self, key: &str) -> Option<String> {
        self.state().markers.get(key).cloned()
    }

    pub fn part(&self, id: &str) -> Option<Persona> {
        self.state().parts.iter().find(|p| p.id == id).cloned()
    }
}

#[async_trait]
impl PartStore for InMemoryStore {
    async fn list_parts(&self) -> Result<Vec<Persona>, ChorusError> {
        self.check()?;
        Ok(self.state().parts.clone())
    }

    async fn set_part_timestamps(
        &self,
        part_id: &str,
        last_active_at: Option<DateTime<Utc>>,
        quiet_since: Option<DateTime<Utc>>,
    ) -> Result<(), ChorusError> {
        self.check()?;
        let mut state = self.state();
        let part = state
            .parts
            .iter_mut()
            .find(|p| p.id == part_id)
            .ok_or_else(|| ChorusError::NotFound {
                kind: "part",
                id: part_id.to_string(),
            })?;
        part.last_active_at = last_active_at;
        part.quiet_since = quiet_since;
        Ok(())
    }

    async fn memories_for_part(
        &self,
        part_id: &str,
        limit: usize,
    ) -> Result<Vec<PartMemory>, ChorusError> {
        self.check()?;
        let own: Vec<PartMemory> = self
            .state()
            .memories
            .iter()
            .filter(|m| m.part_id == part_id)
            .cloned()
            .collect();
        Ok(newest_first(&own, limit, |m| m.timestamp))
    }

    async fn append_memory(&self, memory: &PartMemory) -> Result<(), ChorusError> {
        self.check()?;
        self.state().memories.push(memory.clone());
        Ok(())
    }

    async fn append_thought(&self, thought: &PartThought) -> Result<(), ChorusError> {
        self.check()?;
        self.state().thoughts.push(thought.clone());
        Ok(())
    }

    async fn thoughts_for_entry(&self, entry_id: &str) -> Result<Vec<PartThought>, ChorusError> {
        self.check()?;
        Ok(self
            .state()
            .thoughts
            .iter()
            .filter(|t| t.entry_id == entry_id)
            .cloned()
            .collect())
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Option<Entry>, ChorusError> {
        self.check()?;
        Ok(self.state().entries.iter().find(|e| e.id == entry_id).cloned())
    }

    async fn recent_entries(&self, limit: usize) -> Result<Vec<Entry>, ChorusError> {
        self.check()?;
        Ok(newest_first(&self.state().entries, limit, |e| e.created_at))
    }

    async fn recent_summaries(&self, limit: usize) -> Result<Vec<EntrySummary>, ChorusError> {
        self.check()?;
        Ok(newest_first(&self.state().summaries, limit, |s| s.created_at))
    }

    async fn recent_session_logs(&self, limit: usize) -> Result<Vec<SessionLog>, ChorusError> {
        self.check()?;
        Ok(newest_first(&self.state().session_logs, limit, |l| l.started_at))
    }

    async fn count_session_logs(&self) -> Result<usize, ChorusError> {
        self.check()?;
        Ok(self.state().session_logs.len())
    }

    async fn get_marker(&self, key: &str) -> Result<Option<String>, ChorusError> {
        self.check()?;
        Ok(self.state().markers.get(key).cloned())
    }

    async fn set_marker(&self, key: &str, value: &str) -> Result<(), ChorusError> {
        self.check()?;
        self.state().markers.insert(key.into(), value.into());
        Ok(())
    }

    async fn user_profile(&self) -> Result<Option<UserProfile>, ChorusError> {
        self.check()?;
        Ok(self.state().profile.clone())
    }
}
