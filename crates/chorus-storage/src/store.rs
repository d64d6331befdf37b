// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`PartStore`] trait.

use async_trait::async_trait;
use chorus_core::{
    ChorusError, Entry, EntrySummary, PartMemory, PartStore, PartThought, Persona, SessionLog,
    UserProfile,
};
use chrono::{DateTime, Utc};

use crate::database::Database;
use crate::queries;

/// SQLite-backed part store.
///
/// Besides the trait surface used by the engine it exposes the write
/// operations owned by the host (roster seeding, entries, summaries,
/// session logs, profile).
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database at `path` and wrap it.
    pub async fn open(path: &str) -> Result<Self, ChorusError> {
        Ok(Self::new(Database::open(path).await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Replace the roster; personas keep the order given.
    pub async fn seed_parts(&self, parts: &[Persona]) -> Result<(), ChorusError> {
        for (position, part) in parts.iter().enumerate() {
            queries::parts::upsert_part(&self.db, position as i64, part).await?;
        }
        Ok(())
    }

    pub async fn upsert_entry(&self, entry: &Entry) -> Result<(), ChorusError> {
        queries::entries::upsert_entry(&self.db, entry).await
    }

    pub async fn insert_summary(&self, summary: &EntrySummary) -> Result<(), ChorusError> {
        queries::entries::insert_summary(&self.db, summary).await
    }

    pub async fn insert_session_log(&self, log: &SessionLog) -> Result<(), ChorusError> {
        queries::sessions::insert_session_log(&self.db, log).await
    }

    pub async fn set_user_profile(&self, profile: &UserProfile) -> Result<(), ChorusError> {
        queries::markers::set_user_profile(&self.db, profile).await
    }

    pub async fn close(&self) -> Result<(), ChorusError> {
        self.db.close().await
    }
}

#[async_trait]
impl PartStore for SqliteStore {
    async fn list_parts(&self) -> Result<Vec<Persona>, ChorusError> {
        queries::parts::list_parts(&self.db).await
    }

    async fn set_part_timestamps(
        &self,
        part_id: &str,
        last_active_at: Option<DateTime<Utc>>,
        quiet_since: Option<DateTime<Utc>>,
    ) -> Result<(), ChorusError> {
        queries::parts::set_part_timestamps(&self.db, part_id, last_active_at, quiet_since).await
    }

    async fn memories_for_part(
        &self,
        part_id: &str,
        limit: usize,
    ) -> Result<Vec<PartMemory>, ChorusError> {
        queries::memories::memories_for_part(&self.db, part_id, limit).await
    }

    async fn append_memory(&self, memory: &PartMemory) -> Result<(), ChorusError> {
        queries::memories::append_memory(&self.db, memory).await
    }

    async fn append_thought(&self, thought: &PartThought) -> Result<(), ChorusError> {
        queries::thoughts::append_thought(&self.db, thought).await
    }

    async fn thoughts_for_entry(&self, entry_id: &str) -> Result<Vec<PartThought>, ChorusError> {
        queries::thoughts::thoughts_for_entry(&self.db, entry_id).await
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Option<Entry>, ChorusError> {
        queries::entries::get_entry(&self.db, entry_id).await
    }

    async fn recent_entries(&self, limit: usize) -> Result<Vec<Entry>, ChorusError> {
        queries::entries::recent_entries(&self.db, limit).await
    }

    async fn recent_summaries(&self, limit: usize) -> Result<Vec<EntrySummary>, ChorusError> {
        queries::entries::recent_summaries(&self.db, limit).await
    }

    async fn recent_session_logs(&self, limit: usize) -> Result<Vec<SessionLog>, ChorusError> {
        queries::sessions::recent_session_logs(&self.db, limit).await
    }

    async fn count_session_logs(&self) -> Result<usize, ChorusError> {
        queries::sessions::count_session_logs(&self.db).await
    }

    async fn get_marker(&self, key: &str) -> Result<Option<String>, ChorusError> {
        queries::markers::get_marker(&self.db, key).await
    }

    async fn set_marker(&self, key: &str, value: &str) -> Result<(), ChorusError> {
        queries::markers::set_marker(&self.db, key, value).await
    }

    async fn user_profile(&self) -> Result<Option<UserProfile>, ChorusError> {
        queries::markers::get_user_profile(&self.db).await
    }
}
