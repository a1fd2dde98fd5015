// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inventory row operations.
//!
//! Deletion relies on `ON DELETE CASCADE` (foreign_keys is ON) to remove
//! items, permissions, corrections, and inventory-scoped audit entries.

use rusqlite::params;
use stocktake_core::{Inventory, Item, StocktakeError};

use crate::database::{map_tr_err, Database};

fn row_to_inventory(row: &rusqlite::Row) -> Result<Inventory, rusqlite::Error> {
    Ok(Inventory {
        id: row.get(0)?,
        name: row.get(1)?,
        display_name: row.get(2)?,
        owner_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Insert a new inventory. The unique name constraint surfaces as Conflict.
pub async fn insert_inventory(
    db: &Database,
    inventory: &Inventory,
) -> Result<(), StocktakeError> {
    let inventory = inventory.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO inventories (id, name, display_name, owner_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    inventory.id,
                    inventory.name,
                    inventory.display_name,
                    inventory.owner_id,
                    inventory.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert an inventory and its initial items in one transaction; a failed
/// item insert rolls the inventory row back too.
pub async fn insert_inventory_with_items(
    db: &Database,
    inventory: &Inventory,
    items: &[Item],
) -> Result<(), StocktakeError> {
    let inventory = inventory.clone();
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let fields_json = serde_json::to_string(&item.fields).map_err(StocktakeError::storage)?;
        rows.push((item.clone(), fields_json));
    }
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO inventories (id, name, display_name, owner_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    inventory.id,
                    inventory.name,
                    inventory.display_name,
                    inventory.owner_id,
                    inventory.created_at,
                ],
            )?;
            for (item, fields_json) in &rows {
                tx.execute(
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
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look up an inventory by its unique name.
pub async fn get_inventory_by_name(
    db: &Database,
    name: &str,
) -> Result<Option<Inventory>, StocktakeError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, display_name, owner_id, created_at
                 FROM inventories WHERE name = ?1",
            )?;
            match stmt.query_row(params![name], row_to_inventory) {
                Ok(inventory) => Ok(Some(inventory)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All inventories, newest first.
pub async fn list_inventories(db: &Database) -> Result<Vec<Inventory>, StocktakeError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, display_name, owner_id, created_at
                 FROM inventories ORDER BY created_at DESC",
            )?;
            let inventories = stmt
                .query_map([], row_to_inventory)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(inventories)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete an inventory by id; the cascade removes everything it owns.
pub async fn delete_inventory(db: &Database, inventory_id: &str) -> Result<(), StocktakeError> {
    let inventory_id = inventory_id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| {
            let rows = conn.execute(
                "DELETE FROM inventories WHERE id = ?1",
                params![inventory_id],
            )?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;
    if deleted == 0 {
        return Err(StocktakeError::NotFound("inventory".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users;
    use stocktake_core::types::{new_id, now_iso};
    use stocktake_core::User;

    async fn seed_owner(db: &Database) -> User {
        let owner = User {
            id: new_id(),
            email: "alice@x".to_string(),
            display_name: "alice".to_string(),
            created_at: now_iso(),
        };
        users::insert_user(db, &owner).await.unwrap();
        owner
    }

    fn make_inventory(name: &str, owner_id: &str) -> Inventory {
        Inventory {
            id: new_id(),
            name: name.to_string(),
            display_name: name.to_string(),
            owner_id: owner_id.to_string(),
            created_at: now_iso(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_by_name() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_owner(&db).await;
        let inventory = make_inventory("lab-2024", &owner.id);
        insert_inventory(&db, &inventory).await.unwrap();

        let found = get_inventory_by_name(&db, "lab-2024").await.unwrap().unwrap();
        assert_eq!(found, inventory);
        assert!(get_inventory_by_name(&db, "lab-2025").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_name_is_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_owner(&db).await;
        insert_inventory(&db, &make_inventory("lab-2024", &owner.id))
            .await
            .unwrap();
        let err = insert_inventory(&db, &make_inventory("lab-2024", &owner.id))
            .await
            .unwrap_err();
        assert!(matches!(err, StocktakeError::Conflict(_)));
    }

    fn make_item(inventory_id: &str, number: &str) -> Item {
        Item {
            id: new_id(),
            inventory_id: inventory_id.to_string(),
            number: number.to_string(),
            fields: stocktake_core::fields::ItemFields::from_pairs(vec![("ROOM", "214")]),
            registered_during_recon: false,
            recon: None,
            created_at: now_iso(),
        }
    }

    #[tokio::test]
    async fn inventory_and_items_land_together() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_owner(&db).await;
        let inventory = make_inventory("lab-2024", &owner.id);
        let items = vec![
            make_item(&inventory.id, "A-100"),
            make_item(&inventory.id, "B-200"),
        ];
        insert_inventory_with_items(&db, &inventory, &items).await.unwrap();

        assert!(get_inventory_by_name(&db, "lab-2024").await.unwrap().is_some());
        assert_eq!(
            crate::queries::items::list_items(&db, &inventory.id).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn failed_item_insert_rolls_back_the_inventory_row() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_owner(&db).await;
        let inventory = make_inventory("lab-2024", &owner.id);
        // The second item violates the (inventory, number) constraint mid
        // transaction; the inventory row must not survive it.
        let items = vec![
            make_item(&inventory.id, "A-100"),
            make_item(&inventory.id, "A-100"),
        ];
        let err = insert_inventory_with_items(&db, &inventory, &items)
            .await
            .unwrap_err();
        assert!(matches!(err, StocktakeError::Conflict(_)));
        assert!(get_inventory_by_name(&db, "lab-2024").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_inventory_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let err = delete_inventory(&db, "no-such-id").await.unwrap_err();
        assert!(matches!(err, StocktakeError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_returns_all() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_owner(&db).await;
        insert_inventory(&db, &make_inventory("a", &owner.id)).await.unwrap();
        insert_inventory(&db, &make_inventory("b", &owner.id)).await.unwrap();
        assert_eq!(list_inventories(&db).await.unwrap().len(), 2);
    }
}
