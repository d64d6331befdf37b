// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted part thoughts. Written once per successful generation, never updated.

use chorus_core::{ChorusError, PartThought};
use rusqlite::params;

use super::{parse_ts, ts};
use crate::database::{Database, map_tr_err};

pub async fn append_thought(db: &Database, thought: &PartThought) -> Result<(), ChorusError> {
    let thought = thought.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO thoughts (id, part_id, entry_id, content, anchor_text, anchor_offset,
                    timestamp, is_disagreement, responding_to_part_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    thought.id,
                    thought.part_id,
                    thought.entry_id,
                    thought.content,
                    thought.anchor_text,
                    i64::try_from(thought.anchor_offset).unwrap_or(i64::MAX),
                    ts(&thought.timestamp),
                    thought.is_disagreement,
                    thought.responding_to_part_id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Thoughts for one entry, oldest first.
pub async fn thoughts_for_entry(
    db: &Database,
    entry_id: &str,
) -> Result<Vec<PartThought>, ChorusError> {
    let entry_id = entry_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<PartThought>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, part_id, entry_id, content, anchor_text, anchor_offset, timestamp,
                        is_disagreement, responding_to_part_id
                 FROM thoughts WHERE entry_id = ?1 ORDER BY timestamp ASC, rowid ASC",
            )?;
            let thoughts = stmt
                .query_map(params![entry_id], |row| {
                    let offset: i64 = row.get(5)?;
                    Ok(PartThought {
                        id: row.get(0)?,
                        part_id: row.get(1)?,
                        entry_id: row.get(2)?,
                        content: row.get(3)?,
                        anchor_text: row.get(4)?,
                        anchor_offset: usize::try_from(offset).unwrap_or_default(),
                        timestamp: parse_ts(6, &row.get::<_, String>(6)?)?,
                        is_disagreement: row.get(7)?,
                        responding_to_part_id: row.get(8)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(thoughts)
        })
        .await
        .map_err(map_tr_err)
}
