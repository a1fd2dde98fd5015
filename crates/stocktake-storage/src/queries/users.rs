// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User row operations.

use rusqlite::params;
use stocktake_core::{StocktakeError, User};

use crate::database::{map_tr_err, Database};

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Insert a new user. The unique email constraint surfaces as Conflict.
pub async fn insert_user(db: &Database, user: &User) -> Result<(), StocktakeError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, email, display_name, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user.id, user.email, user.display_name, user.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a user by email.
pub async fn get_user_by_email(
    db: &Database,
    email: &str,
) -> Result<Option<User>, StocktakeError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, display_name, created_at FROM users WHERE email = ?1",
            )?;
            match stmt.query_row(params![email], row_to_user) {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a user by id.
pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, StocktakeError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn
                .prepare("SELECT id, email, display_name, created_at FROM users WHERE id = ?1")?;
            match stmt.query_row(params![id], row_to_user) {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}
