// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`InventoryStore`] fake.
//!
//! Mirrors the SQLite store's observable semantics, including Conflict on
//! the same uniqueness rules, cascade on inventory delete, and ordering
//! guarantees. Services tested against this fake behave identically against
//! the real store.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use stocktake_core::traits::InventoryStore;
use stocktake_core::{
    AuditAction, AuditEntry, AuditFilter, Correction, Inventory, Item, Permission,
    PermissionGrant, ReconStamp, StocktakeError, User,
};
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    inventories: Vec<Inventory>,
    items: Vec<Item>,
    permissions: Vec<Permission>,
    corrections: Vec<Correction>,
    audit: Vec<AuditEntry>,
    next_audit_id: i64,
}

/// Shared-state fake; clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StocktakeError> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StocktakeError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }
        inner.users.push(user.clone());
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StocktakeError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StocktakeError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_inventory(&self, inventory: &Inventory) -> Result<(), StocktakeError> {
        let mut inner = self.inner.lock().await;
        if inner.inventories.iter().any(|i| i.name == inventory.name) {
            return Err(StocktakeError::Conflict(format!(
                "inventory {} already exists",
                inventory.name
            )));
        }
        inner.inventories.push(inventory.clone());
        Ok(())
    }

    async fn insert_inventory_with_items(
        &self,
        inventory: &Inventory,
        items: &[Item],
    ) -> Result<(), StocktakeError> {
        let mut inner = self.inner.lock().await;
        if inner.inventories.iter().any(|i| i.name == inventory.name) {
            return Err(StocktakeError::Conflict(format!(
                "inventory {} already exists",
                inventory.name
            )));
        }
        // Validate everything before mutating so a conflict leaves no
        // partial inventory behind, like the SQLite transaction.
        let mut seen = HashSet::new();
        for item in items {
            let taken = inner
                .items
                .iter()
                .any(|i| i.inventory_id == item.inventory_id && i.number == item.number);
            if taken || !seen.insert(item.number.clone()) {
                return Err(StocktakeError::Conflict(format!(
                    "item {} already exists",
                    item.number
                )));
            }
        }
        inner.inventories.push(inventory.clone());
        inner.items.extend(items.iter().cloned());
        Ok(())
    }

    async fn get_inventory_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Inventory>, StocktakeError> {
        let inner = self.inner.lock().await;
        Ok(inner.inventories.iter().find(|i| i.name == name).cloned())
    }

    async fn list_inventories(&self) -> Result<Vec<Inventory>, StocktakeError> {
        let inner = self.inner.lock().await;
        let mut inventories = inner.inventories.clone();
        inventories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(inventories)
    }

    async fn delete_inventory(&self, inventory_id: &str) -> Result<(), StocktakeError> {
        let mut inner = self.inner.lock().await;
        let before = inner.inventories.len();
        inner.inventories.retain(|i| i.id != inventory_id);
        if inner.inventories.len() == before {
            return Err(StocktakeError::NotFound("inventory".to_string()));
        }
        inner.items.retain(|i| i.inventory_id != inventory_id);
        inner.permissions.retain(|p| p.inventory_id != inventory_id);
        inner.corrections.retain(|c| c.inventory_id != inventory_id);
        inner
            .audit
            .retain(|a| a.inventory_id.as_deref() != Some(inventory_id));
        Ok(())
    }

    async fn insert_item(&self, item: &Item) -> Result<(), StocktakeError> {
        let mut inner = self.inner.lock().await;
        if inner
            .items
            .iter()
            .any(|i| i.inventory_id == item.inventory_id && i.number == item.number)
        {
            return Err(StocktakeError::Conflict(format!(
                "item {} already exists",
                item.number
            )));
        }
        inner.items.push(item.clone());
        Ok(())
    }

    async fn get_item(
        &self,
        inventory_id: &str,
        number: &str,
    ) -> Result<Option<Item>, StocktakeError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .items
            .iter()
            .find(|i| i.inventory_id == inventory_id && i.number == number)
            .cloned())
    }

    async fn list_items(&self, inventory_id: &str) -> Result<Vec<Item>, StocktakeError> {
        let inner = self.inner.lock().await;
        let mut items: Vec<Item> = inner
            .items
            .iter()
            .filter(|i| i.inventory_id == inventory_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(items)
    }

    async fn set_recon_stamp(
        &self,
        inventory_id: &str,
        number: &str,
        stamp: &ReconStamp,
    ) -> Result<(), StocktakeError> {
        let mut inner = self.inner.lock().await;
        let item = inner
            .items
            .iter_mut()
            .find(|i| i.inventory_id == inventory_id && i.number == number)
            .ok_or_else(|| StocktakeError::NotFound(format!("item {number}")))?;
        item.recon = Some(stamp.clone());
        Ok(())
    }

    async fn insert_permission(&self, permission: &Permission) -> Result<(), StocktakeError> {
        let mut inner = self.inner.lock().await;
        if inner.permissions.iter().any(|p| {
            p.inventory_id == permission.inventory_id && p.user_id == permission.user_id
        }) {
            return Err(StocktakeError::Conflict(
                "permission already exists".to_string(),
            ));
        }
        inner.permissions.push(permission.clone());
        Ok(())
    }

    async fn get_permission(
        &self,
        inventory_id: &str,
        user_id: &str,
    ) -> Result<Option<Permission>, StocktakeError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .permissions
            .iter()
            .find(|p| p.inventory_id == inventory_id && p.user_id == user_id)
            .cloned())
    }

    async fn set_permission_active(
        &self,
        inventory_id: &str,
        user_id: &str,
        active: bool,
    ) -> Result<(), StocktakeError> {
        let mut inner = self.inner.lock().await;
        let permission = inner
            .permissions
            .iter_mut()
            .find(|p| p.inventory_id == inventory_id && p.user_id == user_id)
            .ok_or_else(|| StocktakeError::NotFound("permission".to_string()))?;
        permission.active = active;
        Ok(())
    }

    async fn list_permissions(
        &self,
        inventory_id: &str,
    ) -> Result<Vec<PermissionGrant>, StocktakeError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Permission> = inner
            .permissions
            .iter()
            .filter(|p| p.inventory_id == inventory_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.granted_at.cmp(&b.granted_at).then(a.id.cmp(&b.id)));
        let mut grants = Vec::with_capacity(rows.len());
        for permission in rows {
            let grantee = inner
                .users
                .iter()
                .find(|u| u.id == permission.user_id)
                .cloned()
                .ok_or_else(|| StocktakeError::NotFound("grantee user".to_string()))?;
            grants.push(PermissionGrant { permission, grantee });
        }
        Ok(grants)
    }

    async fn insert_correction(&self, correction: &Correction) -> Result<(), StocktakeError> {
        let mut inner = self.inner.lock().await;
        inner.corrections.push(correction.clone());
        Ok(())
    }

    async fn list_corrections(
        &self,
        inventory_id: &str,
        item_number: &str,
    ) -> Result<Vec<Correction>, StocktakeError> {
        let inner = self.inner.lock().await;
        let mut corrections: Vec<Correction> = inner
            .corrections
            .iter()
            .filter(|c| c.inventory_id == inventory_id && c.item_number == item_number)
            .cloned()
            .collect();
        // Stable sort: the backing Vec is insertion-ordered, so same-stamp
        // corrections keep their append order like SQLite's rowid tiebreak.
        corrections.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(corrections)
    }

    async fn has_corrections(
        &self,
        inventory_id: &str,
        item_number: &str,
    ) -> Result<bool, StocktakeError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .corrections
            .iter()
            .any(|c| c.inventory_id == inventory_id && c.item_number == item_number))
    }

    async fn count_corrections(&self, inventory_id: &str) -> Result<i64, StocktakeError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .corrections
            .iter()
            .filter(|c| c.inventory_id == inventory_id)
            .count() as i64)
    }

    async fn list_corrections_for_inventory(
        &self,
        inventory_id: &str,
    ) -> Result<Vec<Correction>, StocktakeError> {
        let inner = self.inner.lock().await;
        let mut corrections: Vec<Correction> = inner
            .corrections
            .iter()
            .filter(|c| c.inventory_id == inventory_id)
            .cloned()
            .collect();
        corrections.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(corrections)
    }

    async fn append_audit(
        &self,
        action: AuditAction,
        user_id: &str,
        inventory_id: Option<&str>,
        details: &serde_json::Value,
    ) -> Result<i64, StocktakeError> {
        let mut inner = self.inner.lock().await;
        inner.next_audit_id += 1;
        let id = inner.next_audit_id;
        inner.audit.push(AuditEntry {
            id,
            action,
            user_id: user_id.to_string(),
            inventory_id: inventory_id.map(str::to_string),
            details: details.clone(),
            created_at: stocktake_core::types::now_iso(),
        });
        Ok(id)
    }

    async fn list_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, StocktakeError> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<AuditEntry> = inner
            .audit
            .iter()
            .filter(|e| {
                filter
                    .inventory_id
                    .as_ref()
                    .is_none_or(|id| e.inventory_id.as_ref() == Some(id))
            })
            .filter(|e| filter.user_id.as_ref().is_none_or(|id| &e.user_id == id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        if let Some(limit) = filter.limit {
            entries.truncate(limit.max(0) as usize);
        }
        Ok(entries)
    }
}
