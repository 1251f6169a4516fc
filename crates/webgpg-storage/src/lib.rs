// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the webgpg secret-protection subsystem.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. The schema is one
//! `secrets(name, value)` key-value table; the subsystem's only row is the
//! persisted master salt.

pub mod database;
pub mod migrations;

pub use database::Database;
