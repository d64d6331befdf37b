// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Chorus orchestration engine.
//!
//! WAL-mode SQLite with embedded refinery migrations and a single-writer
//! model via `tokio-rusqlite`. [`SqliteStore`] implements the engine's
//! [`PartStore`](chorus_core::PartStore) boundary.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
