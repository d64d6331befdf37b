// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only part memories.

use chorus_core::{ChorusError, MemoryKind, PartMemory};
use rusqlite::params;

use super::{parse_ts, sql_limit, ts};
use crate::database::{Database, map_tr_err};

/// Newest memories for a part, newest first.
pub async fn memories_for_part(
    db: &Database,
    part_id: &str,
    limit: usize,
) -> Result<Vec<PartMemory>, ChorusError> {
    let part_id = part_id.to_string();
    let limit = sql_limit(limit);
    db.connection()
        .call(move |conn| -> Result<Vec<PartMemory>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, part_id, entry_id, content, type, timestamp
                 FROM memories WHERE part_id = ?1
                 ORDER BY timestamp DESC, rowid DESC LIMIT ?2",
            )?;
            let memories = stmt
                .query_map(params![part_id, limit], |row| {
                    let kind: Option<String> = row.get(4)?;
                    Ok(PartMemory {
                        id: row.get(0)?,
                        part_id: row.get(1)?,
                        entry_id: row.get(2)?,
                        content: row.get(3)?,
                        kind: MemoryKind::from_str_value(kind.as_deref()),
                        timestamp: parse_ts(5, &row.get::<_, String>(5)?)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(memories)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn append_memory(db: &Database, memory: &PartMemory) -> Result<(), ChorusError> {
    let memory = memory.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO memories (id, part_id, entry_id, content, type, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    memory.id,
                    memory.part_id,
                    memory.entry_id,
                    memory.content,
                    memory.kind.as_str(),
                    ts(&memory.timestamp),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
