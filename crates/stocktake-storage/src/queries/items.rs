// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item row operations.
//!
//! The original `fields` set is stored as a JSON blob and never rewritten;
//! only the reconciliation stamp columns are mutable.

use rusqlite::params;
use stocktake_core::fields::ItemFields;
use stocktake_core::{Item, ReconStamp, StocktakeError};

use crate::database::{map_tr_err, Database};

const SELECT_ITEM: &str = "SELECT id, inventory_id, number, fields, registered_during_recon,
        found_room, found_status, reconciled_by, reconciled_at, created_at
 FROM items";

fn row_to_item(row: &rusqlite::Row) -> Result<Item, rusqlite::Error> {
    let fields_json: String = row.get(3)?;
    let fields: ItemFields = serde_json::from_str(&fields_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let reconciled_by: Option<String> = row.get(7)?;
    let reconciled_at: Option<String> = row.get(8)?;
    // A stamp exists only when both identity and timestamp are present.
    let recon = match (reconciled_by, reconciled_at) {
        (Some(by), Some(at)) => Some(ReconStamp {
            found_room: row.get(5)?,
            found_status: row.get(6)?,
            reconciled_by: by,
            reconciled_at: at,
        }),
        _ => None,
    };
    Ok(Item {
        id: row.get(0)?,
        inventory_id: row.get(1)?,
        number: row.get(2)?,
        fields,
        registered_during_recon: row.get(4)?,
        recon,
        created_at: row.get(9)?,
    })
}

/// Insert a new item. A duplicate number within the inventory is Conflict.
pub async fn insert_item(db: &Database, item: &Item) -> Result<(), StocktakeError> {
    let fields_json = serde_json::to_string(&item.fields).map_err(StocktakeError::storage)?;
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO items (id, inventory_id, number, fields,
                                    registered_during_recon, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.id,
                    item.inventory_id,
                    item.number,
                    fields_json,
                    item.registered_during_recon,
                    item.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one item by its number within an inventory.
pub async fn get_item(
    db: &Database,
    inventory_id: &str,
    number: &str,
) -> Result<Option<Item>, StocktakeError> {
    let inventory_id = inventory_id.to_string();
    let number = number.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("{SELECT_ITEM} WHERE inventory_id = ?1 AND number = ?2"))?;
            match stmt.query_row(params![inventory_id, number], row_to_item) {
                Ok(item) => Ok(Some(item)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All items of an inventory, ordered by item number.
pub async fn list_items(db: &Database, inventory_id: &str) -> Result<Vec<Item>, StocktakeError> {
    let inventory_id = inventory_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("{SELECT_ITEM} WHERE inventory_id = ?1 ORDER BY number"))?;
            let items = stmt
                .query_map(params![inventory_id], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite an item's reconciliation stamp. NotFound if the item is absent.
pub async fn set_recon_stamp(
    db: &Database,
    inventory_id: &str,
    number: &str,
    stamp: &ReconStamp,
) -> Result<(), StocktakeError> {
    let inventory_id = inventory_id.to_string();
    let number = number.to_string();
    let stamp = stamp.clone();
    let row_number = number.clone();
    let updated = db
        .connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE items
                 SET found_room = ?1, found_status = ?2, reconciled_by = ?3, reconciled_at = ?4
                 WHERE inventory_id = ?5 AND number = ?6",
                params![
                    stamp.found_room,
                    stamp.found_status,
                    stamp.reconciled_by,
                    stamp.reconciled_at,
                    inventory_id,
                    row_number,
                ],
            )?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;
    if updated == 0 {
        return Err(StocktakeError::NotFound(format!("item {number}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{inventories, users};
    use stocktake_core::types::{new_id, now_iso};
    use stocktake_core::{Inventory, User};

    async fn seed_inventory(db: &Database) -> (User, Inventory) {
        let owner = User {
            id: new_id(),
            email: "alice@x".to_string(),
            display_name: "alice".to_string(),
            created_at: now_iso(),
        };
        users::insert_user(db, &owner).await.unwrap();
        let inventory = Inventory {
            id: new_id(),
            name: "lab-2024".to_string(),
            display_name: "Lab 2024".to_string(),
            owner_id: owner.id.clone(),
            created_at: now_iso(),
        };
        inventories::insert_inventory(db, &inventory).await.unwrap();
        (owner, inventory)
    }

    fn make_item(inventory_id: &str, number: &str, room: &str) -> Item {
        let fields = ItemFields::from_pairs(vec![("ROOM", room), ("DESCRIPTION", "oscilloscope")]);
        Item {
            id: new_id(),
            inventory_id: inventory_id.to_string(),
            number: number.to_string(),
            fields,
            registered_during_recon: false,
            recon: None,
            created_at: now_iso(),
        }
    }

    #[tokio::test]
    async fn insert_get_roundtrips_fields_json() {
        let db = Database::open_in_memory().await.unwrap();
        let (_owner, inventory) = seed_inventory(&db).await;
        let item = make_item(&inventory.id, "A-100", "214");
        insert_item(&db, &item).await.unwrap();

        let found = get_item(&db, &inventory.id, "A-100").await.unwrap().unwrap();
        assert_eq!(found, item);
        assert_eq!(found.fields.get("ROOM"), Some("214"));
        assert!(found.recon.is_none());
    }

    #[tokio::test]
    async fn duplicate_number_in_same_inventory_is_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        let (_owner, inventory) = seed_inventory(&db).await;
        insert_item(&db, &make_item(&inventory.id, "A-100", "214")).await.unwrap();
        let err = insert_item(&db, &make_item(&inventory.id, "A-100", "215"))
            .await
            .unwrap_err();
        assert!(matches!(err, StocktakeError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_orders_by_number() {
        let db = Database::open_in_memory().await.unwrap();
        let (_owner, inventory) = seed_inventory(&db).await;
        insert_item(&db, &make_item(&inventory.id, "B-2", "1")).await.unwrap();
        insert_item(&db, &make_item(&inventory.id, "A-1", "1")).await.unwrap();
        let numbers: Vec<String> = list_items(&db, &inventory.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.number)
            .collect();
        assert_eq!(numbers, vec!["A-1", "B-2"]);
    }

    #[tokio::test]
    async fn stamp_overwrites_and_reads_back() {
        let db = Database::open_in_memory().await.unwrap();
        let (owner, inventory) = seed_inventory(&db).await;
        insert_item(&db, &make_item(&inventory.id, "A-100", "214")).await.unwrap();

        let stamp = ReconStamp {
            found_room: Some("215".to_string()),
            found_status: Some("in use".to_string()),
            reconciled_by: owner.id.clone(),
            reconciled_at: now_iso(),
        };
        set_recon_stamp(&db, &inventory.id, "A-100", &stamp).await.unwrap();

        let item = get_item(&db, &inventory.id, "A-100").await.unwrap().unwrap();
        assert_eq!(item.recon, Some(stamp.clone()));

        // Re-confirmation replaces the stamp wholesale.
        let second = ReconStamp {
            found_room: Some("216".to_string()),
            ..stamp
        };
        set_recon_stamp(&db, &inventory.id, "A-100", &second).await.unwrap();
        let item = get_item(&db, &inventory.id, "A-100").await.unwrap().unwrap();
        assert_eq!(item.recon.unwrap().found_room.as_deref(), Some("216"));
    }

    #[tokio::test]
    async fn stamping_missing_item_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let (owner, inventory) = seed_inventory(&db).await;
        let stamp = ReconStamp {
            found_room: None,
            found_status: None,
            reconciled_by: owner.id,
            reconciled_at: now_iso(),
        };
        let err = set_recon_stamp(&db, &inventory.id, "ghost", &stamp)
            .await
            .unwrap_err();
        assert!(matches!(err, StocktakeError::NotFound(_)));
    }
}
