// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Permission row operations.
//!
//! One row per `(inventory_id, user_id)`; the unique constraint is what
//! decides concurrent grant races. Revocation flips `active` in place.

use rusqlite::params;
use stocktake_core::{Permission, PermissionGrant, StocktakeError, User};

use crate::database::{map_tr_err, Database};

fn row_to_permission(row: &rusqlite::Row) -> Result<Permission, rusqlite::Error> {
    Ok(Permission {
        id: row.get(0)?,
        inventory_id: row.get(1)?,
        user_id: row.get(2)?,
        active: row.get(3)?,
        granted_by: row.get(4)?,
        granted_at: row.get(5)?,
    })
}

/// Insert a permission row. Conflict if the pair already has one.
pub async fn insert_permission(
    db: &Database,
    permission: &Permission,
) -> Result<(), StocktakeError> {
    let permission = permission.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO permissions (id, inventory_id, user_id, active, granted_by, granted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    permission.id,
                    permission.inventory_id,
                    permission.user_id,
                    permission.active,
                    permission.granted_by,
                    permission.granted_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The permission row for a user on an inventory, active or not.
pub async fn get_permission(
    db: &Database,
    inventory_id: &str,
    user_id: &str,
) -> Result<Option<Permission>, StocktakeError> {
    let inventory_id = inventory_id.to_string();
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, inventory_id, user_id, active, granted_by, granted_at
                 FROM permissions WHERE inventory_id = ?1 AND user_id = ?2",
            )?;
            match stmt.query_row(params![inventory_id, user_id], row_to_permission) {
                Ok(permission) => Ok(Some(permission)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Flip the active flag on an existing row. NotFound if no row exists.
pub async fn set_permission_active(
    db: &Database,
    inventory_id: &str,
    user_id: &str,
    active: bool,
) -> Result<(), StocktakeError> {
    let inventory_id = inventory_id.to_string();
    let user_id = user_id.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE permissions SET active = ?1 WHERE inventory_id = ?2 AND user_id = ?3",
                params![active, inventory_id, user_id],
            )?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;
    if updated == 0 {
        return Err(StocktakeError::NotFound("permission".to_string()));
    }
    Ok(())
}

/// All permission rows of an inventory with the grantee joined in, ordered
/// by grant time.
pub async fn list_permissions(
    db: &Database,
    inventory_id: &str,
) -> Result<Vec<PermissionGrant>, StocktakeError> {
    let inventory_id = inventory_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.inventory_id, p.user_id, p.active, p.granted_by, p.granted_at,
                        u.id, u.email, u.display_name, u.created_at
                 FROM permissions p
                 JOIN users u ON u.id = p.user_id
                 WHERE p.inventory_id = ?1
                 ORDER BY p.granted_at, p.id",
            )?;
            let grants = stmt
                .query_map(params![inventory_id], |row| {
                    Ok(PermissionGrant {
                        permission: row_to_permission(row)?,
                        grantee: User {
                            id: row.get(6)?,
                            email: row.get(7)?,
                            display_name: row.get(8)?,
                            created_at: row.get(9)?,
                        },
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(grants)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{inventories, users};
    use stocktake_core::types::{new_id, now_iso};
    use stocktake_core::Inventory;

    async fn seed_user(db: &Database, email: &str) -> User {
        let user = User {
            id: new_id(),
            email: email.to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            created_at: now_iso(),
        };
        users::insert_user(db, &user).await.unwrap();
        user
    }

    async fn seed_inventory(db: &Database, owner: &User) -> Inventory {
        let inventory = Inventory {
            id: new_id(),
            name: "lab-2024".to_string(),
            display_name: "Lab 2024".to_string(),
            owner_id: owner.id.clone(),
            created_at: now_iso(),
        };
        inventories::insert_inventory(db, &inventory).await.unwrap();
        inventory
    }

    fn make_permission(inventory: &Inventory, user: &User, granted_by: &User) -> Permission {
        Permission {
            id: new_id(),
            inventory_id: inventory.id.clone(),
            user_id: user.id.clone(),
            active: true,
            granted_by: granted_by.id.clone(),
            granted_at: now_iso(),
        }
    }

    #[tokio::test]
    async fn grant_then_lookup() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_user(&db, "alice@x").await;
        let bob = seed_user(&db, "bob@x").await;
        let inventory = seed_inventory(&db, &owner).await;

        let permission = make_permission(&inventory, &bob, &owner);
        insert_permission(&db, &permission).await.unwrap();

        let found = get_permission(&db, &inventory.id, &bob.id).await.unwrap().unwrap();
        assert_eq!(found, permission);
        assert!(found.active);
    }

    #[tokio::test]
    async fn duplicate_pair_is_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_user(&db, "alice@x").await;
        let bob = seed_user(&db, "bob@x").await;
        let inventory = seed_inventory(&db, &owner).await;

        insert_permission(&db, &make_permission(&inventory, &bob, &owner))
            .await
            .unwrap();
        let err = insert_permission(&db, &make_permission(&inventory, &bob, &owner))
            .await
            .unwrap_err();
        assert!(matches!(err, StocktakeError::Conflict(_)));
    }

    #[tokio::test]
    async fn revoke_flips_active_and_keeps_row() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_user(&db, "alice@x").await;
        let bob = seed_user(&db, "bob@x").await;
        let inventory = seed_inventory(&db, &owner).await;

        insert_permission(&db, &make_permission(&inventory, &bob, &owner))
            .await
            .unwrap();
        set_permission_active(&db, &inventory.id, &bob.id, false).await.unwrap();

        let found = get_permission(&db, &inventory.id, &bob.id).await.unwrap().unwrap();
        assert!(!found.active);
    }

    #[tokio::test]
    async fn flipping_missing_permission_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_user(&db, "alice@x").await;
        let inventory = seed_inventory(&db, &owner).await;
        let err = set_permission_active(&db, &inventory.id, "no-user", false)
            .await
            .unwrap_err();
        assert!(matches!(err, StocktakeError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_embeds_grantee_identity() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = seed_user(&db, "alice@x").await;
        let bob = seed_user(&db, "bob@x").await;
        let carol = seed_user(&db, "carol@x").await;
        let inventory = seed_inventory(&db, &owner).await;

        insert_permission(&db, &make_permission(&inventory, &bob, &owner))
            .await
            .unwrap();
        insert_permission(&db, &make_permission(&inventory, &carol, &owner))
            .await
            .unwrap();

        let grants = list_permissions(&db, &inventory.id).await.unwrap();
        assert_eq!(grants.len(), 2);
        let emails: Vec<&str> = grants.iter().map(|g| g.grantee.email.as_str()).collect();
        assert!(emails.contains(&"bob@x"));
        assert!(emails.contains(&"carol@x"));
    }
}
