// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable string markers and the singleton user profile row.

use chorus_core::{ChorusError, UserProfile};
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use super::{parse_json, to_json, ts};
use crate::database::{Database, map_tr_err};

pub async fn get_marker(db: &Database, key: &str) -> Result<Option<String>, ChorusError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT value FROM markers WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_marker(db: &Database, key: &str, value: &str) -> Result<(), ChorusError> {
    let key = key.to_string();
    let value = value.to_string();
    let now = ts(&Utc::now());
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO markers (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_user_profile(db: &Database) -> Result<Option<UserProfile>, ChorusError> {
    db.connection()
        .call(|conn| -> Result<Option<UserProfile>, rusqlite::Error> {
            conn.query_row(
                "SELECT recurring_themes, emotional_patterns, avoidance_patterns, growth_signals,
                        inner_landscape
                 FROM user_profile WHERE id = 1",
                [],
                |row| {
                    Ok(UserProfile {
                        recurring_themes: parse_json(0, &row.get::<_, String>(0)?)?,
                        emotional_patterns: parse_json(1, &row.get::<_, String>(1)?)?,
                        avoidance_patterns: parse_json(2, &row.get::<_, String>(2)?)?,
                        growth_signals: parse_json(3, &row.get::<_, String>(3)?)?,
                        inner_landscape: row.get(4)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the user profile.
pub async fn set_user_profile(db: &Database, profile: &UserProfile) -> Result<(), ChorusError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO user_profile
                    (id, recurring_themes, emotional_patterns, avoidance_patterns, growth_signals,
                     inner_landscape)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5)",
                params![
                    to_json(&profile.recurring_themes)?,
                    to_json(&profile.emotional_patterns)?,
                    to_json(&profile.avoidance_patterns)?,
                    to_json(&profile.growth_signals)?,
                    profile.inner_landscape,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;

    #[tokio::test]
    async fn marker_overwrites() {
        let (db, _dir) = setup_db().await;
        assert_eq!(get_marker(&db, "observer:watcher").await.unwrap(), None);
        set_marker(&db, "observer:watcher", "e1").await.unwrap();
        set_marker(&db, "observer:watcher", "e4").await.unwrap();
        assert_eq!(
            get_marker(&db, "observer:watcher").await.unwrap().as_deref(),
            Some("e4")
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn profile_is_a_singleton() {
        let (db, _dir) = setup_db().await;
        assert_eq!(get_user_profile(&db).await.unwrap(), None);

        let mut profile = UserProfile {
            avoidance_patterns: vec!["my father".to_string()],
            ..Default::default()
        };
        set_user_profile(&db, &profile).await.unwrap();
        profile.growth_signals.push("asks for help sooner".to_string());
        set_user_profile(&db, &profile).await.unwrap();

        assert_eq!(get_user_profile(&db).await.unwrap(), Some(profile));
        db.close().await.unwrap();
    }
}
