// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inventory lifecycle: creation from an ingested row-set, owner-only
//! deletion, ad-hoc registration during the walkthrough, and the status
//! view over the classifier.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use stocktake_access::AccessControl;
use stocktake_audit::AuditLog;
use stocktake_core::fields::ItemFields;
use stocktake_core::traits::InventoryStore;
use stocktake_core::types::{new_id, now_iso};
use stocktake_core::{
    AuditAction, Identity, Inventory, Item, ItemRow, ItemStatus, StocktakeError,
};
use tracing::info;

/// One row of the access-gated status view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub item: Item,
    pub status: ItemStatus,
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    access: AccessControl,
    audit: AuditLog,
}

impl InventoryService {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        access: AccessControl,
        audit: AuditLog,
    ) -> InventoryService {
        InventoryService {
            store,
            access,
            audit,
        }
    }

    /// Create an inventory from an ingested row-set. The caller becomes
    /// the owner; duplicate numbers within the row-set are rejected up
    /// front so no partial item set is left behind.
    pub async fn create(
        &self,
        owner_identity: &Identity,
        name: &str,
        display_name: &str,
        rows: Vec<ItemRow>,
    ) -> Result<Inventory, StocktakeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StocktakeError::Invalid("inventory name is blank".to_string()));
        }
        let mut seen = HashSet::new();
        for row in &rows {
            if row.number.trim().is_empty() {
                return Err(StocktakeError::Invalid("item number is blank".to_string()));
            }
            if !seen.insert(row.number.trim().to_string()) {
                return Err(StocktakeError::Conflict(format!(
                    "duplicate item number {} in row-set",
                    row.number.trim()
                )));
            }
        }

        let owner = stocktake_access::resolve(&self.store, owner_identity).await?;
        let display_name = match display_name.trim() {
            "" => name.to_string(),
            other => other.to_string(),
        };
        let inventory = Inventory {
            id: new_id(),
            name: name.to_string(),
            display_name,
            owner_id: owner.id.clone(),
            created_at: now_iso(),
        };
        let items: Vec<Item> = rows
            .into_iter()
            .map(|row| Item {
                id: new_id(),
                inventory_id: inventory.id.clone(),
                number: row.number.trim().to_string(),
                fields: row.fields,
                registered_during_recon: false,
                recon: None,
                created_at: now_iso(),
            })
            .collect();
        let item_count = items.len();
        // One transaction: a fault while inserting items must not leave a
        // partial inventory, and the unique name constraint serializes
        // concurrent creates.
        self.store
            .insert_inventory_with_items(&inventory, &items)
            .await?;

        self.audit
            .record(
                AuditAction::InventoryCreated,
                &owner.id,
                Some(&inventory.id),
                json!({"name": inventory.name, "items": item_count}),
            )
            .await;
        info!(inventory = %inventory.name, items = item_count, "inventory created");
        Ok(inventory)
    }

    /// Owner-only cascade delete. The audit entry is written first, scoped
    /// to no inventory, so it survives its own subject's removal.
    pub async fn delete(&self, inventory_name: &str, email: &str) -> Result<(), StocktakeError> {
        let (inventory, user) = self
            .require_access(inventory_name, email, "delete", true)
            .await?;
        self.audit
            .record(
                AuditAction::InventoryDeleted,
                &user.id,
                None,
                json!({"name": inventory.name, "inventory_id": inventory.id}),
            )
            .await;
        self.store.delete_inventory(&inventory.id).await?;
        info!(inventory = inventory_name, "inventory deleted");
        Ok(())
    }

    /// Register an item found during the walkthrough that was never in the
    /// submitted row-set. Needs access, not ownership.
    pub async fn register_item(
        &self,
        inventory_name: &str,
        email: &str,
        number: &str,
        fields: ItemFields,
    ) -> Result<Item, StocktakeError> {
        let (inventory, user) = self
            .require_access(inventory_name, email, "register", false)
            .await?;
        let number = number.trim();
        if number.is_empty() {
            return Err(StocktakeError::Invalid("item number is blank".to_string()));
        }
        let item = Item {
            id: new_id(),
            inventory_id: inventory.id.clone(),
            number: number.to_string(),
            fields,
            registered_during_recon: true,
            recon: None,
            created_at: now_iso(),
        };
        self.store.insert_item(&item).await?;
        self.audit
            .record(
                AuditAction::ItemRegistered,
                &user.id,
                Some(&inventory.id),
                json!({"item": number}),
            )
            .await;
        info!(inventory = inventory_name, item = number, "item registered during walkthrough");
        Ok(item)
    }

    /// The status view: every item joined with its derived state and the
    /// has-corrections flag. Access-gated and audited as a view.
    pub async fn item_statuses(
        &self,
        inventory_name: &str,
        email: &str,
    ) -> Result<Vec<ItemView>, StocktakeError> {
        let (inventory, user) = self
            .require_access(inventory_name, email, "view", false)
            .await?;
        let items = self.store.list_items(&inventory.id).await?;
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            let has_corrections = self
                .store
                .has_corrections(&inventory.id, &item.number)
                .await?;
            let status = stocktake_recon::classify(&item, has_corrections);
            views.push(ItemView { item, status });
        }
        self.audit
            .record(
                AuditAction::InventoryViewed,
                &user.id,
                Some(&inventory.id),
                json!({"items": views.len()}),
            )
            .await;
        Ok(views)
    }

    /// All inventories, for the CLI listing. Unrestricted metadata read.
    pub async fn list(&self) -> Result<Vec<Inventory>, StocktakeError> {
        self.store.list_inventories().await
    }

    async fn require_access(
        &self,
        inventory_name: &str,
        email: &str,
        operation: &str,
        owner_only: bool,
    ) -> Result<(Inventory, stocktake_core::User), StocktakeError> {
        let inventory = self
            .store
            .get_inventory_by_name(inventory_name)
            .await?
            .ok_or_else(|| StocktakeError::NotFound(format!("inventory {inventory_name}")))?;
        let decision = self.access.check_access(inventory_name, email).await?;
        let allowed = if owner_only {
            decision.is_owner
        } else {
            decision.has_access
        };
        if !allowed {
            self.audit
                .record(
                    AuditAction::AccessDenied,
                    email,
                    Some(&inventory.id),
                    json!({"operation": operation}),
                )
                .await;
            return Err(StocktakeError::Forbidden(if owner_only {
                format!("only the owner of {inventory_name} may {operation}")
            } else {
                format!("{email} has no access to {inventory_name}")
            }));
        }
        let user = self.store.get_user_by_email(email).await?.ok_or_else(|| {
            StocktakeError::Internal(format!("user {email} granted but missing"))
        })?;
        Ok((inventory, user))
    }
}
