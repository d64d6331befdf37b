// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. Do NOT open additional connections for writes.

use std::path::Path;

use chorus_core::ChorusError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into `ChorusError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ChorusError {
    ChorusError::storage(e)
}

/// Handle to the Chorus SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path`, apply pragmas and migrations.
    pub async fn open(path: &str) -> Result<Self, ChorusError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(ChorusError::storage)?;
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(ChorusError::storage)?;
        let db = Self { conn };
        db.initialize(true).await?;
        debug!(path, "database opened");
        Ok(db)
    }

    /// Open with explicit WAL control (WAL is meaningless for in-memory databases).
    pub async fn open_with_config(
        config: &chorus_config::model::StorageConfig,
    ) -> Result<Self, ChorusError> {
        if config.wal_mode {
            return Self::open(&config.database_path).await;
        }
        let conn = tokio_rusqlite::Connection::open(&config.database_path)
            .await
            .map_err(ChorusError::storage)?;
        let db = Self { conn };
        db.initialize(false).await?;
        Ok(db)
    }

    /// Private in-memory database, mainly for tests.
    pub async fn open_in_memory() -> Result<Self, ChorusError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(ChorusError::storage)?;
        let db = Self { conn };
        db.initialize(false).await?;
        Ok(db)
    }

    async fn initialize(&self, wal: bool) -> Result<(), ChorusError> {
        self.conn
            .call(move |conn| -> Result<Result<(), ChorusError>, rusqlite::Error> {
                if wal {
                    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
                }
                conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
                Ok(migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn close(&self) -> Result<(), ChorusError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
