// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed implementation of the storage port.

use async_trait::async_trait;
use stocktake_config::StorageConfig;
use stocktake_core::traits::InventoryStore;
use stocktake_core::{
    AuditAction, AuditEntry, AuditFilter, Correction, Inventory, Item, Permission,
    PermissionGrant, ReconStamp, StocktakeError, User,
};

use crate::database::Database;
use crate::queries;

/// The production [`InventoryStore`]: a thin adapter over the per-entity
/// query modules, sharing one [`Database`] handle.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the database described by the storage config section.
    pub async fn open(config: &StorageConfig) -> Result<SqliteStore, StocktakeError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        Ok(SqliteStore { db })
    }

    /// In-memory store with migrations applied, for tests and dry runs.
    pub async fn open_in_memory() -> Result<SqliteStore, StocktakeError> {
        let db = Database::open_in_memory().await?;
        Ok(SqliteStore { db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint and flush before shutdown.
    pub async fn close(&self) -> Result<(), StocktakeError> {
        self.db.close().await
    }
}

#[async_trait]
impl InventoryStore for SqliteStore {
    async fn insert_user(&self, user: &User) -> Result<(), StocktakeError> {
        queries::users::insert_user(&self.db, user).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StocktakeError> {
        queries::users::get_user_by_email(&self.db, email).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StocktakeError> {
        queries::users::get_user(&self.db, id).await
    }

    async fn insert_inventory(&self, inventory: &Inventory) -> Result<(), StocktakeError> {
        queries::inventories::insert_inventory(&self.db, inventory).await
    }

    async fn insert_inventory_with_items(
        &self,
        inventory: &Inventory,
        items: &[Item],
    ) -> Result<(), StocktakeError> {
        queries::inventories::insert_inventory_with_items(&self.db, inventory, items).await
    }

    async fn get_inventory_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Inventory>, StocktakeError> {
        queries::inventories::get_inventory_by_name(&self.db, name).await
    }

    async fn list_inventories(&self) -> Result<Vec<Inventory>, StocktakeError> {
        queries::inventories::list_inventories(&self.db).await
    }

    async fn delete_inventory(&self, inventory_id: &str) -> Result<(), StocktakeError> {
        queries::inventories::delete_inventory(&self.db, inventory_id).await
    }

    async fn insert_item(&self, item: &Item) -> Result<(), StocktakeError> {
        queries::items::insert_item(&self.db, item).await
    }

    async fn get_item(
        &self,
        inventory_id: &str,
        number: &str,
    ) -> Result<Option<Item>, StocktakeError> {
        queries::items::get_item(&self.db, inventory_id, number).await
    }

    async fn list_items(&self, inventory_id: &str) -> Result<Vec<Item>, StocktakeError> {
        queries::items::list_items(&self.db, inventory_id).await
    }

    async fn set_recon_stamp(
        &self,
        inventory_id: &str,
        number: &str,
        stamp: &ReconStamp,
    ) -> Result<(), StocktakeError> {
        queries::items::set_recon_stamp(&self.db, inventory_id, number, stamp).await
    }

    async fn insert_permission(&self, permission: &Permission) -> Result<(), StocktakeError> {
        queries::permissions::insert_permission(&self.db, permission).await
    }

    async fn get_permission(
        &self,
        inventory_id: &str,
        user_id: &str,
    ) -> Result<Option<Permission>, StocktakeError> {
        queries::permissions::get_permission(&self.db, inventory_id, user_id).await
    }

    async fn set_permission_active(
        &self,
        inventory_id: &str,
        user_id: &str,
        active: bool,
    ) -> Result<(), StocktakeError> {
        queries::permissions::set_permission_active(&self.db, inventory_id, user_id, active).await
    }

    async fn list_permissions(
        &self,
        inventory_id: &str,
    ) -> Result<Vec<PermissionGrant>, StocktakeError> {
        queries::permissions::list_permissions(&self.db, inventory_id).await
    }

    async fn insert_correction(&self, correction: &Correction) -> Result<(), StocktakeError> {
        queries::corrections::insert_correction(&self.db, correction).await
    }

    async fn list_corrections(
        &self,
        inventory_id: &str,
        item_number: &str,
    ) -> Result<Vec<Correction>, StocktakeError> {
        queries::corrections::list_corrections(&self.db, inventory_id, item_number).await
    }

    async fn has_corrections(
        &self,
        inventory_id: &str,
        item_number: &str,
    ) -> Result<bool, StocktakeError> {
        queries::corrections::has_corrections(&self.db, inventory_id, item_number).await
    }

    async fn count_corrections(&self, inventory_id: &str) -> Result<i64, StocktakeError> {
        queries::corrections::count_corrections(&self.db, inventory_id).await
    }

    async fn list_corrections_for_inventory(
        &self,
        inventory_id: &str,
    ) -> Result<Vec<Correction>, StocktakeError> {
        queries::corrections::list_corrections_for_inventory(&self.db, inventory_id).await
    }

    async fn append_audit(
        &self,
        action: AuditAction,
        user_id: &str,
        inventory_id: Option<&str>,
        details: &serde_json::Value,
    ) -> Result<i64, StocktakeError> {
        queries::audit::append_audit(&self.db, action, user_id, inventory_id, details).await
    }

    async fn list_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, StocktakeError> {
        queries::audit::list_audit(&self.db, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stocktake_core::types::{new_id, now_iso};

    #[tokio::test]
    async fn store_is_usable_through_the_port() {
        let store: Arc<dyn InventoryStore> = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        let user = User {
            id: new_id(),
            email: "alice@x".to_string(),
            display_name: "alice".to_string(),
            created_at: now_iso(),
        };
        store.insert_user(&user).await.unwrap();
        let found = store.get_user_by_email("alice@x").await.unwrap().unwrap();
        assert_eq!(found, user);
    }
}
