// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journal entries and their reflection summaries.

use chorus_core::{ChorusError, Entry, EntrySummary};
use rusqlite::{OptionalExtension, params};

use super::{parse_json, parse_ts, sql_limit, to_json, ts};
use crate::database::{Database, map_tr_err};

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: parse_ts(2, &row.get::<_, String>(2)?)?,
    })
}

/// Insert or replace an entry's text.
pub async fn upsert_entry(db: &Database, entry: &Entry) -> Result<(), ChorusError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO entries (id, content, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET content = excluded.content",
                params![entry.id, entry.content, ts(&entry.created_at)],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_entry(db: &Database, entry_id: &str) -> Result<Option<Entry>, ChorusError> {
    let entry_id = entry_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Entry>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, content, created_at FROM entries WHERE id = ?1",
                params![entry_id],
                row_to_entry,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent entries, newest first.
pub async fn recent_entries(db: &Database, limit: usize) -> Result<Vec<Entry>, ChorusError> {
    let limit = sql_limit(limit);
    db.connection()
        .call(move |conn| -> Result<Vec<Entry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, content, created_at FROM entries
                 ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )?;
            let entries = stmt
                .query_map(params![limit], row_to_entry)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_summary(db: &Database, summary: &EntrySummary) -> Result<(), ChorusError> {
    let summary = summary.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO entry_summaries
                    (id, entry_id, themes, emotional_arc, key_moments, unresolved_threads, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    summary.id,
                    summary.entry_id,
                    to_json(&summary.themes)?,
                    summary.emotional_arc,
                    to_json(&summary.key_moments)?,
                    to_json(&summary.unresolved_threads)?,
                    ts(&summary.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent summaries, newest first.
pub async fn recent_summaries(
    db: &Database,
    limit: usize,
) -> Result<Vec<EntrySummary>, ChorusError> {
    let limit = sql_limit(limit);
    db.connection()
        .call(move |conn| -> Result<Vec<EntrySummary>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, entry_id, themes, emotional_arc, key_moments, unresolved_threads, created_at
                 FROM entry_summaries ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )?;
            let summaries = stmt
                .query_map(params![limit], |row| {
                    Ok(EntrySummary {
                        id: row.get(0)?,
                        entry_id: row.get(1)?,
                        themes: parse_json(2, &row.get::<_, String>(2)?)?,
                        emotional_arc: row.get(3)?,
                        key_moments: parse_json(4, &row.get::<_, String>(4)?)?,
                        unresolved_threads: parse_json(5, &row.get::<_, String>(5)?)?,
                        created_at: parse_ts(6, &row.get::<_, String>(6)?)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(summaries)
        })
        .await
        .map_err(map_tr_err)
}
