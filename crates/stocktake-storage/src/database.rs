// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread; the database is the sole serialization point between concurrent
//! request handlers. Do not create additional Connection instances for writes.

use std::path::Path;

use stocktake_core::StocktakeError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the open SQLite database.
///
/// Cloneable; all clones share the single background connection thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if necessary) the database at `path`, apply PRAGMAs,
    /// and run pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Database, StocktakeError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StocktakeError::storage)?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(StocktakeError::storage)?;
        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        conn.call(migrations::run_migrations)
            .await
            .map_err(map_worker_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Database { conn })
    }

    /// In-memory database with migrations applied. Test-only convenience.
    pub async fn open_in_memory() -> Result<Database, StocktakeError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(StocktakeError::storage)?;
        conn.call(|conn| {
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        conn.call(migrations::run_migrations)
            .await
            .map_err(map_worker_err)?;
        Ok(Database { conn })
    }

    /// The underlying tokio-rusqlite connection for query modules.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and flush pending writes.
    pub async fn close(&self) -> Result<(), StocktakeError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Convert tokio-rusqlite errors into the core taxonomy.
///
/// SQLite constraint violations surface as `Conflict` -- the store's unique
/// constraints are the serialization point for racing writers, and callers
/// translate Conflict into domain messages ("user already has access").
/// Everything else is a fatal `Storage` fault.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StocktakeError {
    if let tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(err, ref msg)) = e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return StocktakeError::Conflict(
                msg.clone()
                    .unwrap_or_else(|| "unique constraint violation".to_string()),
            );
        }
    }
    StocktakeError::Storage { source: Box::new(e) }
}

/// For calls whose closures already speak the core taxonomy.
fn map_worker_err(e: tokio_rusqlite::Error<StocktakeError>) -> StocktakeError {
    match e {
        tokio_rusqlite::Error::Error(e) => e,
        other => StocktakeError::Internal(format!("database worker: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("stocktake.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn migrations_create_expected_tables() {
        let db = Database::open_in_memory().await.unwrap();
        let tables: Vec<String> = db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(map_tr_err)
            .unwrap();
        for expected in [
            "audit_log",
            "corrections",
            "inventories",
            "items",
            "permissions",
            "users",
        ] {
            assert!(
                tables.iter().any(|t| t == expected),
                "missing table {expected}, got {tables:?}"
            );
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();

        let db = Database::open(path, true).await.unwrap();
        db.close().await.unwrap();
        drop(db);

        // Second open must not re-run V1.
        let db = Database::open(path, true).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn constraint_violation_maps_to_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        db.connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO users (id, email, display_name) VALUES (?1, ?2, ?3)",
                    rusqlite::params!["u1", "a@x", "A"],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
            .unwrap();
        let err = db
            .connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO users (id, email, display_name) VALUES (?1, ?2, ?3)",
                    rusqlite::params!["u2", "a@x", "A again"],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
            .unwrap_err();
        assert!(matches!(err, StocktakeError::Conflict(_)), "got {err:?}");
    }
}
