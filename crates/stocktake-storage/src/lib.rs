// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Stocktake.
//!
//! Built on rusqlite behind tokio-rusqlite's single background connection
//! thread; schema managed by refinery embedded migrations. [`SqliteStore`]
//! implements the storage port from `stocktake-core`.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
