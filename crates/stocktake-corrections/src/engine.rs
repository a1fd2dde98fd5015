// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The correction engine: access-gated append of minimal diffs plus the
//! read-side history views.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use stocktake_access::AccessControl;
use stocktake_audit::AuditLog;
use stocktake_core::fields::ItemFields;
use stocktake_core::traits::InventoryStore;
use stocktake_core::types::{new_id, now_iso};
use stocktake_core::{AuditAction, Correction, Inventory, StocktakeError};
use tracing::info;

#[derive(Clone)]
pub struct CorrectionEngine {
    store: Arc<dyn InventoryStore>,
    access: AccessControl,
    audit: AuditLog,
}

impl CorrectionEngine {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        access: AccessControl,
        audit: AuditLog,
    ) -> CorrectionEngine {
        CorrectionEngine {
            store,
            access,
            audit,
        }
    }

    /// Record a correction against an item.
    ///
    /// The submitted field set is reduced to the minimal trimmed diff
    /// against the item's original values; an empty diff is `Invalid` so
    /// noise submissions never append history. The original item row is
    /// never touched.
    pub async fn record(
        &self,
        inventory_name: &str,
        item_number: &str,
        corrector_email: &str,
        submitted: &ItemFields,
        note: Option<String>,
    ) -> Result<Correction, StocktakeError> {
        if submitted.is_empty() {
            return Err(StocktakeError::Invalid("no fields submitted".to_string()));
        }
        let inventory = self.require_inventory(inventory_name).await?;
        let decision = self
            .access
            .check_access(inventory_name, corrector_email)
            .await?;
        if !decision.has_access {
            self.audit
                .record(
                    AuditAction::AccessDenied,
                    corrector_email,
                    Some(&inventory.id),
                    json!({"operation": "correct", "item": item_number}),
                )
                .await;
            return Err(StocktakeError::Forbidden(format!(
                "{corrector_email} has no access to {inventory_name}"
            )));
        }
        // Access implies the user row exists.
        let corrector = self
            .store
            .get_user_by_email(corrector_email)
            .await?
            .ok_or_else(|| {
                StocktakeError::Internal(format!("user {corrector_email} granted but missing"))
            })?;
        let item = self
            .store
            .get_item(&inventory.id, item_number)
            .await?
            .ok_or_else(|| {
                StocktakeError::NotFound(format!("item {item_number} in {inventory_name}"))
            })?;

        let changed_fields = crate::diff::diff_fields(&item.fields, submitted);
        if changed_fields.is_empty() {
            return Err(StocktakeError::Invalid("no fields changed".to_string()));
        }

        let correction = Correction {
            id: new_id(),
            inventory_id: inventory.id.clone(),
            item_number: item_number.to_string(),
            changed_fields,
            corrected_by: corrector.id.clone(),
            note,
            created_at: now_iso(),
        };
        self.store.insert_correction(&correction).await?;
        self.audit
            .record(
                AuditAction::CorrectionRecorded,
                &corrector.id,
                Some(&inventory.id),
                json!({
                    "item": item_number,
                    "fields": correction.changed_fields.keys().collect::<Vec<_>>(),
                }),
            )
            .await;
        info!(
            inventory = inventory_name,
            item = item_number,
            fields = correction.changed_fields.len(),
            "correction recorded"
        );
        Ok(correction)
    }

    /// Full correction history of one item, oldest first.
    pub async fn history(
        &self,
        inventory_name: &str,
        item_number: &str,
    ) -> Result<Vec<Correction>, StocktakeError> {
        let inventory = self.require_inventory(inventory_name).await?;
        self.store
            .list_corrections(&inventory.id, item_number)
            .await
    }

    pub async fn has_corrections(
        &self,
        inventory_name: &str,
        item_number: &str,
    ) -> Result<bool, StocktakeError> {
        let inventory = self.require_inventory(inventory_name).await?;
        self.store.has_corrections(&inventory.id, item_number).await
    }

    pub async fn count_for_inventory(
        &self,
        inventory_name: &str,
    ) -> Result<i64, StocktakeError> {
        let inventory = self.require_inventory(inventory_name).await?;
        self.store.count_corrections(&inventory.id).await
    }

    /// Every correction in the inventory grouped by item number, each
    /// group oldest first.
    pub async fn all_grouped_by_item(
        &self,
        inventory_name: &str,
    ) -> Result<BTreeMap<String, Vec<Correction>>, StocktakeError> {
        let inventory = self.require_inventory(inventory_name).await?;
        let mut grouped: BTreeMap<String, Vec<Correction>> = BTreeMap::new();
        for correction in self
            .store
            .list_corrections_for_inventory(&inventory.id)
            .await?
        {
            grouped
                .entry(correction.item_number.clone())
                .or_default()
                .push(correction);
        }
        Ok(grouped)
    }

    /// Current effective field values of an item: original plus the folded
    /// correction history. Derived, never stored.
    pub async fn effective_fields(
        &self,
        inventory_name: &str,
        item_number: &str,
    ) -> Result<ItemFields, StocktakeError> {
        let inventory = self.require_inventory(inventory_name).await?;
        let item = self
            .store
            .get_item(&inventory.id, item_number)
            .await?
            .ok_or_else(|| {
                StocktakeError::NotFound(format!("item {item_number} in {inventory_name}"))
            })?;
        let history = self
            .store
            .list_corrections(&inventory.id, item_number)
            .await?;
        Ok(crate::diff::effective_fields(&item.fields, &history))
    }

    async fn require_inventory(&self, name: &str) -> Result<Inventory, StocktakeError> {
        self.store
            .get_inventory_by_name(name)
            .await?
            .ok_or_else(|| StocktakeError::NotFound(format!("inventory {name}")))
    }
}
