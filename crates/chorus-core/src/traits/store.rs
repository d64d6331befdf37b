// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence boundary for parts, memories, entries and session history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ChorusError;
use crate::types::{
    Entry, EntrySummary, PartMemory, PartThought, Persona, SessionLog, UserProfile,
};

/// Storage operations the orchestration engine depends on.
///
/// Implementations must be safe to call concurrently from the orchestrator
/// and its spawned background tasks.
#[async_trait]
pub trait PartStore: Send + Sync {
    /// All personas, in roster order.
    async fn list_parts(&self) -> Result<Vec<Persona>, ChorusError>;

    /// Update a part's activity timestamps. `None` clears the field.
    async fn set_part_timestamps(
        &self,
        part_id: &str,
        last_active_at: Option<DateTime<Utc>>,
        quiet_since: Option<DateTime<Utc>>,
    ) -> Result<(), ChorusError>;

    /// Most recent memories for a part, newest first.
    async fn memories_for_part(
        &self,
        part_id: &str,
        limit: usize,
    ) -> Result<Vec<PartMemory>, ChorusError>;

    async fn append_memory(&self, memory: &PartMemory) -> Result<(), ChorusError>;

    async fn append_thought(&self, thought: &PartThought) -> Result<(), ChorusError>;

    /// Thoughts recorded for an entry, oldest first.
    async fn thoughts_for_entry(&self, entry_id: &str) -> Result<Vec<PartThought>, ChorusError>;

    async fn get_entry(&self, entry_id: &str) -> Result<Option<Entry>, ChorusError>;

    /// Most recent entries, newest first.
    async fn recent_entries(&self, limit: usize) -> Result<Vec<Entry>, ChorusError>;

    /// Most recent entry summaries, newest first.
    async fn recent_summaries(&self, limit: usize) -> Result<Vec<EntrySummary>, ChorusError>;

    /// Most recent session logs, newest first.
    async fn recent_session_logs(&self, limit: usize) -> Result<Vec<SessionLog>, ChorusError>;

    async fn count_session_logs(&self) -> Result<usize, ChorusError>;

    /// Read a named marker value (for example the observer's last entry id).
    async fn get_marker(&self, key: &str) -> Result<Option<String>, ChorusError>;

    async fn set_marker(&self, key: &str, value: &str) -> Result<(), ChorusError>;

    async fn user_profile(&self) -> Result<Option<UserProfile>, ChorusError>;
}
