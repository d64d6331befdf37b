// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writing-session logs used for ritual detection.

use std::str::FromStr;

use chorus_core::{ChorusError, SessionLog, TimeOfDay};
use chrono::{Datelike, Weekday};
use rusqlite::params;
use rusqlite::types::Type;

use super::{opt_ts, parse_opt_ts, parse_ts, sql_limit, ts};
use crate::database::{Database, map_tr_err};

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub async fn insert_session_log(db: &Database, log: &SessionLog) -> Result<(), ChorusError> {
    let log = log.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO session_logs (id, started_at, ended_at, word_count, time_of_day, day_of_week)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    log.id,
                    ts(&log.started_at),
                    opt_ts(&log.ended_at),
                    log.word_count,
                    log.time_of_day.to_string(),
                    log.day_of_week.num_days_from_monday(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent session logs, newest first.
pub async fn recent_session_logs(
    db: &Database,
    limit: usize,
) -> Result<Vec<SessionLog>, ChorusError> {
    let limit = sql_limit(limit);
    db.connection()
        .call(move |conn| -> Result<Vec<SessionLog>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, ended_at, word_count, time_of_day, day_of_week
                 FROM session_logs ORDER BY started_at DESC, rowid DESC LIMIT ?1",
            )?;
            let logs = stmt
                .query_map(params![limit], |row| {
                    let bucket: String = row.get(4)?;
                    let time_of_day = TimeOfDay::from_str(&bucket).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
                    })?;
                    let day: u32 = row.get(5)?;
                    let day_of_week = WEEKDAYS
                        .get(day as usize)
                        .copied()
                        .ok_or(rusqlite::Error::IntegralValueOutOfRange(5, i64::from(day)))?;
                    Ok(SessionLog {
                        id: row.get(0)?,
                        started_at: parse_ts(1, &row.get::<_, String>(1)?)?,
                        ended_at: parse_opt_ts(2, row.get(2)?)?,
                        word_count: row.get(3)?,
                        time_of_day,
                        day_of_week,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(logs)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count_session_logs(db: &Database) -> Result<usize, ChorusError> {
    let count = db
        .connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM session_logs", [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err)?;
    Ok(usize::try_from(count).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn logs_round_trip_with_buckets() {
        let (db, _dir) = setup_db().await;
        let start = Utc.with_ymd_and_hms(2026, 5, 4, 6, 30, 0).unwrap(); // a Monday
        for day in 0..3 {
            let log = SessionLog::starting_at(format!("s{day}"), start + Duration::days(day), 300);
            insert_session_log(&db, &log).await.unwrap();
        }

        assert_eq!(count_session_logs(&db).await.unwrap(), 3);
        let logs = recent_session_logs(&db, 2).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].id, "s2");
        assert_eq!(logs[0].day_of_week, Weekday::Wed);
        assert_eq!(logs[0].time_of_day, TimeOfDay::EarlyMorning);
        assert_eq!(logs[1].word_count, 300);
        db.close().await.unwrap();
    }
}
