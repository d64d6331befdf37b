// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona roster operations.

use std::str::FromStr;

use chorus_core::{ChorusError, PartRole, Persona};
use chrono::{DateTime, Utc};
use rusqlite::params;
use rusqlite::types::Type;

use super::{opt_ts, parse_json, parse_opt_ts, to_json};
use crate::database::{Database, map_tr_err};

const SELECT_PARTS: &str = "SELECT id, name, color, color_light, role, voice, concern, system_prompt,
        learned_keywords, learned_emotions, catchphrases, last_active_at, quiet_since
 FROM parts ORDER BY position ASC, id ASC";

fn row_to_persona(row: &rusqlite::Row<'_>) -> rusqlite::Result<Persona> {
    let role: String = row.get(4)?;
    let role = PartRole::from_str(&role)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(Persona {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        color_light: row.get(3)?,
        role,
        voice: row.get(5)?,
        concern: row.get(6)?,
        system_prompt: row.get(7)?,
        learned_keywords: parse_json(8, &row.get::<_, String>(8)?)?,
        learned_emotions: parse_json(9, &row.get::<_, String>(9)?)?,
        catchphrases: parse_json(10, &row.get::<_, String>(10)?)?,
        last_active_at: parse_opt_ts(11, row.get(11)?)?,
        quiet_since: parse_opt_ts(12, row.get(12)?)?,
    })
}

/// All personas in roster order.
pub async fn list_parts(db: &Database) -> Result<Vec<Persona>, ChorusError> {
    db.connection()
        .call(|conn| -> Result<Vec<Persona>, rusqlite::Error> {
            let mut stmt = conn.prepare(SELECT_PARTS)?;
            let parts = stmt
                .query_map([], row_to_persona)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a persona. `position` fixes its roster order.
pub async fn upsert_part(db: &Database, position: i64, part: &Persona) -> Result<(), ChorusError> {
    let part = part.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO parts (id, position, name, color, color_light, role, voice, concern,
                    system_prompt, learned_keywords, learned_emotions, catchphrases,
                    last_active_at, quiet_since)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(id) DO UPDATE SET
                    position = excluded.position, name = excluded.name, color = excluded.color,
                    color_light = excluded.color_light, role = excluded.role,
                    voice = excluded.voice, concern = excluded.concern,
                    system_prompt = excluded.system_prompt,
                    learned_keywords = excluded.learned_keywords,
                    learned_emotions = excluded.learned_emotions,
                    catchphrases = excluded.catchphrases,
                    last_active_at = excluded.last_active_at,
                    quiet_since = excluded.quiet_since",
                params![
                    part.id,
                    position,
                    part.name,
                    part.color,
                    part.color_light,
                    part.role.to_string(),
                    part.voice,
                    part.concern,
                    part.system_prompt,
                    to_json(&part.learned_keywords)?,
                    to_json(&part.learned_emotions)?,
                    to_json(&part.catchphrases)?,
                    opt_ts(&part.last_active_at),
                    opt_ts(&part.quiet_since),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite both activity timestamps of a persona.
pub async fn set_part_timestamps(
    db: &Database,
    part_id: &str,
    last_active_at: Option<DateTime<Utc>>,
    quiet_since: Option<DateTime<Utc>>,
) -> Result<(), ChorusError> {
    let id = part_id.to_string();
    let updated = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE parts SET last_active_at = ?1, quiet_since = ?2 WHERE id = ?3",
                params![opt_ts(&last_active_at), opt_ts(&quiet_since), id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if updated == 0 {
        return Err(ChorusError::NotFound {
            kind: "part",
            id: part_id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;
    use chorus_core::EmotionTag;
    use chrono::TimeZone;

    fn persona(id: &str, role: PartRole) -> Persona {
        let mut p = Persona::new(id, id.to_uppercase(), role);
        p.concern = "being hurt again".to_string();
        p
    }

    #[tokio::test]
    async fn roster_comes_back_in_position_order() {
        let (db, _dir) = setup_db().await;
        upsert_part(&db, 2, &persona("b", PartRole::Exile)).await.unwrap();
        upsert_part(&db, 1, &persona("a", PartRole::SelfEnergy)).await.unwrap();

        let parts = list_parts(&db).await.unwrap();
        let ids: Vec<_> = parts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(parts[0].role, PartRole::SelfEnergy);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn learned_state_round_trips_as_json() {
        let (db, _dir) = setup_db().await;
        let mut p = persona("w", PartRole::Protector);
        p.learned_keywords.insert("deadline".to_string());
        p.learned_emotions.insert(EmotionTag::Anxious);
        p.catchphrases.push("Careful now.".to_string());
        upsert_part(&db, 0, &p).await.unwrap();

        let back = list_parts(&db).await.unwrap().remove(0);
        assert_eq!(back, p);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn timestamps_update_and_clear() {
        let (db, _dir) = setup_db().await;
        let mut p = persona("w", PartRole::Protector);
        p.quiet_since = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        upsert_part(&db, 0, &p).await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 2, 1, 8, 30, 0).unwrap();
        set_part_timestamps(&db, "w", Some(now), None).await.unwrap();

        let back = list_parts(&db).await.unwrap().remove(0);
        assert_eq!(back.last_active_at, Some(now));
        assert_eq!(back.quiet_since, None);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn updating_unknown_part_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = set_part_timestamps(&db, "ghost", None, None).await.unwrap_err();
        assert!(matches!(err, ChorusError::NotFound { kind: "part", .. }));
        db.close().await.unwrap();
    }
}
