// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit log operations. Append and filtered read only; rows are immutable.

use std::str::FromStr;

use rusqlite::params;
use stocktake_core::{AuditAction, AuditEntry, AuditFilter, StocktakeError};

use crate::database::{map_tr_err, Database};

fn row_to_entry(row: &rusqlite::Row) -> Result<AuditEntry, rusqlite::Error> {
    let action_text: String = row.get(1)?;
    let action = AuditAction::from_str(&action_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let details_json: String = row.get(4)?;
    let details: serde_json::Value = serde_json::from_str(&details_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(AuditEntry {
        id: row.get(0)?,
        action,
        user_id: row.get(2)?,
        inventory_id: row.get(3)?,
        details,
        created_at: row.get(5)?,
    })
}

/// Append an entry; returns the assigned row id.
pub async fn append_audit(
    db: &Database,
    action: AuditAction,
    user_id: &str,
    inventory_id: Option<&str>,
    details: &serde_json::Value,
) -> Result<i64, StocktakeError> {
    let action = action.to_string();
    let user_id = user_id.to_string();
    let inventory_id = inventory_id.map(str::to_string);
    let details = details.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO audit_log (action, user_id, inventory_id, details)
                 VALUES (?1, ?2, ?3, ?4)",
                params![action, user_id, inventory_id, details],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Entries matching the filter, newest first.
pub async fn list_audit(
    db: &Database,
    filter: &AuditFilter,
) -> Result<Vec<AuditEntry>, StocktakeError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let mut sql = String::from(
                "SELECT id, action, user_id, inventory_id, details, created_at
                 FROM audit_log WHERE 1 = 1",
            );
            let mut params: Vec<rusqlite::types::Value> = Vec::new();
            if let Some(inventory_id) = filter.inventory_id {
                sql.push_str(&format!(" AND inventory_id = ?{}", params.len() + 1));
                params.push(inventory_id.into());
            }
            if let Some(user_id) = filter.user_id {
                sql.push_str(&format!(" AND user_id = ?{}", params.len() + 1));
                params.push(user_id.into());
            }
            sql.push_str(" ORDER BY id DESC");
            if let Some(limit) = filter.limit {
                sql.push_str(&format!(" LIMIT ?{}", params.len() + 1));
                params.push(limit.into());
            }
            let mut stmt = conn.prepare(&sql)?;
            let entries = stmt
                .query_map(rusqlite::params_from_iter(params), row_to_entry)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}
