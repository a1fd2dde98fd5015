// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The storage port: one trait per deployment backend, injected into every
//! service so tests can substitute an in-memory fake.

use async_trait::async_trait;

use crate::error::StocktakeError;
use crate::types::{
    AuditAction, AuditEntry, AuditFilter, Correction, Inventory, Item, Permission,
    PermissionGrant, ReconStamp, User,
};

/// Persistence operations for every entity the reconciliation core owns.
///
/// Each mutating method is a single atomic store transaction. Uniqueness
/// violations surface as [`StocktakeError::Conflict`] so the store's unique
/// constraints serve as the serialization point for racing writers
/// (duplicate grants, duplicate item numbers).
#[async_trait]
pub trait InventoryStore: Send + Sync {
    // --- Users ---

    /// Insert a new user. Conflict if the email is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), StocktakeError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StocktakeError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, StocktakeError>;

    // --- Inventories ---

    /// Insert a new inventory. Conflict if the name is already taken.
    async fn insert_inventory(&self, inventory: &Inventory) -> Result<(), StocktakeError>;

    /// Insert an inventory together with its initial items in one
    /// transaction. Conflict on a duplicate name or item number; on any
    /// failure nothing is persisted.
    async fn insert_inventory_with_items(
        &self,
        inventory: &Inventory,
        items: &[Item],
    ) -> Result<(), StocktakeError>;

    async fn get_inventory_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Inventory>, StocktakeError>;

    async fn list_inventories(&self) -> Result<Vec<Inventory>, StocktakeError>;

    /// Delete an inventory and cascade to its items, permissions,
    /// corrections, and inventory-scoped audit entries.
    async fn delete_inventory(&self, inventory_id: &str) -> Result<(), StocktakeError>;

    // --- Items ---

    /// Insert a new item. Conflict if the number already exists in the inventory.
    async fn insert_item(&self, item: &Item) -> Result<(), StocktakeError>;

    async fn get_item(
        &self,
        inventory_id: &str,
        number: &str,
    ) -> Result<Option<Item>, StocktakeError>;

    /// All items of an inventory, ordered by item number.
    async fn list_items(&self, inventory_id: &str) -> Result<Vec<Item>, StocktakeError>;

    /// Stamp (or re-stamp) an item's reconciliation fields. NotFound if the
    /// item does not exist. Overwrite semantics are deliberate -- callers
    /// audit the previous stamp before replacing it.
    async fn set_recon_stamp(
        &self,
        inventory_id: &str,
        number: &str,
        stamp: &ReconStamp,
    ) -> Result<(), StocktakeError>;

    // --- Permissions ---

    /// Insert a permission row. Conflict if a row for `(inventory_id, user_id)`
    /// already exists -- this constraint decides grant/grant races.
    async fn insert_permission(&self, permission: &Permission) -> Result<(), StocktakeError>;

    async fn get_permission(
        &self,
        inventory_id: &str,
        user_id: &str,
    ) -> Result<Option<Permission>, StocktakeError>;

    /// Flip the active flag of an existing permission row. NotFound if absent.
    async fn set_permission_active(
        &self,
        inventory_id: &str,
        user_id: &str,
        active: bool,
    ) -> Result<(), StocktakeError>;

    /// All permission rows of an inventory with the grantee identity embedded.
    async fn list_permissions(
        &self,
        inventory_id: &str,
    ) -> Result<Vec<PermissionGrant>, StocktakeError>;

    // --- Corrections ---

    /// Append a correction. Never overwrites; racing submissions both land
    /// as independent rows, and insertion order breaks creation-time ties.
    async fn insert_correction(&self, correction: &Correction) -> Result<(), StocktakeError>;

    /// Correction history for one item, oldest first.
    async fn list_corrections(
        &self,
        inventory_id: &str,
        item_number: &str,
    ) -> Result<Vec<Correction>, StocktakeError>;

    /// O(1) existence check used by list views.
    async fn has_corrections(
        &self,
        inventory_id: &str,
        item_number: &str,
    ) -> Result<bool, StocktakeError>;

    async fn count_corrections(&self, inventory_id: &str) -> Result<i64, StocktakeError>;

    /// Every correction in the inventory, ordered by creation time. The
    /// correction engine groups these by item number for report views.
    async fn list_corrections_for_inventory(
        &self,
        inventory_id: &str,
    ) -> Result<Vec<Correction>, StocktakeError>;

    // --- Audit ---

    /// Append an audit entry; returns the store-assigned row id.
    async fn append_audit(
        &self,
        action: AuditAction,
        user_id: &str,
        inventory_id: Option<&str>,
        details: &serde_json::Value,
    ) -> Result<i64, StocktakeError>;

    /// Audit entries matching the filter, newest first.
    async fn list_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, StocktakeError>;
}
