// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correction row operations.
//!
//! Corrections are append-only; history order is `created_at` with the
//! monotonic SQLite rowid as tiebreak so same-millisecond submissions
//! keep their insertion order.

use std::collections::BTreeMap;

use rusqlite::params;
use stocktake_core::{Correction, FieldChange, StocktakeError};

use crate::database::{map_tr_err, Database};

const SELECT_CORRECTION: &str =
    "SELECT id, inventory_id, item_number, changed_fields, corrected_by, note, created_at
 FROM corrections";

fn row_to_correction(row: &rusqlite::Row) -> Result<Correction, rusqlite::Error> {
    let changed_json: String = row.get(3)?;
    let changed_fields: BTreeMap<String, FieldChange> = serde_json::from_str(&changed_json)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(Correction {
        id: row.get(0)?,
        inventory_id: row.get(1)?,
        item_number: row.get(2)?,
        changed_fields,
        corrected_by: row.get(4)?,
        note: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Append a correction row.
pub async fn insert_correction(
    db: &Database,
    correction: &Correction,
) -> Result<(), StocktakeError> {
    let changed_json =
        serde_json::to_string(&correction.changed_fields).map_err(StocktakeError::storage)?;
    let correction = correction.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO corrections
                     (id, inventory_id, item_number, changed_fields, corrected_by, note, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    correction.id,
                    correction.inventory_id,
                    correction.item_number,
                    changed_json,
                    correction.corrected_by,
                    correction.note,
                    correction.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Full history for one item, oldest first.
pub async fn list_corrections(
    db: &Database,
    inventory_id: &str,
    item_number: &str,
) -> Result<Vec<Correction>, StocktakeError> {
    let inventory_id = inventory_id.to_string();
    let item_number = item_number.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_CORRECTION} WHERE inventory_id = ?1 AND item_number = ?2
                 ORDER BY created_at, rowid"
            ))?;
            let corrections = stmt
                .query_map(params![inventory_id, item_number], row_to_correction)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(corrections)
        })
        .await
        .map_err(map_tr_err)
}

/// Cheap existence probe for list views.
pub async fn has_corrections(
    db: &Database,
    inventory_id: &str,
    item_number: &str,
) -> Result<bool, StocktakeError> {
    let inventory_id = inventory_id.to_string();
    let item_number = item_number.to_string();
    db.connection()
        .call(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(
                     SELECT 1 FROM corrections WHERE inventory_id = ?1 AND item_number = ?2
                 )",
                params![inventory_id, item_number],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
        .map_err(map_tr_err)
}

/// Total number of corrections recorded against an inventory.
pub async fn count_corrections(db: &Database, inventory_id: &str) -> Result<i64, StocktakeError> {
    let inventory_id = inventory_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM corrections WHERE inventory_id = ?1",
                params![inventory_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

/// Every correction in the inventory, oldest first.
pub async fn list_corrections_for_inventory(
    db: &Database,
    inventory_id: &str,
) -> Result<Vec<Correction>, StocktakeError> {
    let inventory_id = inventory_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_CORRECTION} WHERE inventory_id = ?1 ORDER BY created_at, rowid"
            ))?;
            let corrections = stmt
                .query_map(params![inventory_id], row_to_correction)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(corrections)
        })
        .await
        .map_err(map_tr_err)
}
