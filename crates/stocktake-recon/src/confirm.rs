// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Physical confirmation during the walkthrough.

use std::sync::Arc;

use serde_json::json;
use stocktake_access::AccessControl;
use stocktake_audit::AuditLog;
use stocktake_core::fields::trimmed;
use stocktake_core::traits::InventoryStore;
use stocktake_core::types::now_iso;
use stocktake_core::{AuditAction, Item, ReconStamp, StocktakeError};
use tracing::info;

#[derive(Clone)]
pub struct Reconciliation {
    store: Arc<dyn InventoryStore>,
    access: AccessControl,
    audit: AuditLog,
}

impl Reconciliation {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        access: AccessControl,
        audit: AuditLog,
    ) -> Reconciliation {
        Reconciliation {
            store,
            access,
            audit,
        }
    }

    /// Confirm that an item was physically sighted.
    ///
    /// Re-confirmation overwrites the stamp, but the previous stamp goes
    /// into the audit details first so the overwrite stays observable.
    pub async fn confirm(
        &self,
        inventory_name: &str,
        item_number: &str,
        email: &str,
        found_room: Option<String>,
        found_status: Option<String>,
    ) -> Result<Item, StocktakeError> {
        let inventory = self
            .store
            .get_inventory_by_name(inventory_name)
            .await?
            .ok_or_else(|| StocktakeError::NotFound(format!("inventory {inventory_name}")))?;
        let decision = self.access.check_access(inventory_name, email).await?;
        if !decision.has_access {
            self.audit
                .record(
                    AuditAction::AccessDenied,
                    email,
                    Some(&inventory.id),
                    json!({"operation": "reconcile", "item": item_number}),
                )
                .await;
            return Err(StocktakeError::Forbidden(format!(
                "{email} has no access to {inventory_name}"
            )));
        }
        let user = self.store.get_user_by_email(email).await?.ok_or_else(|| {
            StocktakeError::Internal(format!("user {email} granted but missing"))
        })?;
        let item = self
            .store
            .get_item(&inventory.id, item_number)
            .await?
            .ok_or_else(|| {
                StocktakeError::NotFound(format!("item {item_number} in {inventory_name}"))
            })?;

        let stamp = ReconStamp {
            found_room: trimmed(found_room.as_deref()).map(str::to_string),
            found_status: trimmed(found_status.as_deref()).map(str::to_string),
            reconciled_by: user.id.clone(),
            reconciled_at: now_iso(),
        };
        self.store
            .set_recon_stamp(&inventory.id, item_number, &stamp)
            .await?;
        self.audit
            .record(
                AuditAction::ItemReconciled,
                &user.id,
                Some(&inventory.id),
                json!({
                    "item": item_number,
                    "found_room": stamp.found_room,
                    "previous": item.recon,
                }),
            )
            .await;
        info!(inventory = inventory_name, item = item_number, "item reconciled");
        Ok(Item {
            recon: Some(stamp),
            ..item
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktake_core::{AuditFilter, ReconState};
    use stocktake_test_utils::{fixtures, MemoryStore};

    struct Setup {
        store: Arc<dyn InventoryStore>,
        access: AccessControl,
        audit: AuditLog,
        recon: Reconciliation,
    }

    async fn setup() -> Setup {
        let store: Arc<dyn InventoryStore> = Arc::new(MemoryStore::new());
        let owner = fixtures::user("owner@x");
        store.insert_user(&owner).await.unwrap();
        let inventory = fixtures::inventory("lab-2024", &owner.id);
        store.insert_inventory(&inventory).await.unwrap();
        store
            .insert_item(&fixtures::item(&inventory.id, "A-100", "214"))
            .await
            .unwrap();
        let audit = AuditLog::new(store.clone());
        let access = AccessControl::new(store.clone(), audit.clone());
        Setup {
            recon: Reconciliation::new(store.clone(), access.clone(), audit.clone()),
            store,
            access,
            audit,
        }
    }

    #[tokio::test]
    async fn confirm_stamps_and_classifies() {
        let s = setup().await;
        let item = s
            .recon
            .confirm("lab-2024", "A-100", "owner@x", Some("214".to_string()), None)
            .await
            .unwrap();
        let status = crate::classify(&item, false);
        assert_eq!(status.state, ReconState::FoundInPlace);
        let stamp = item.recon.unwrap();
        assert_eq!(stamp.found_room.as_deref(), Some("214"));
        assert!(!stamp.reconciled_by.is_empty());
    }

    #[tokio::test]
    async fn reconfirmation_overwrites_but_audits_previous_stamp() {
        let s = setup().await;
        s.recon
            .confirm("lab-2024", "A-100", "owner@x", Some("214".to_string()), None)
            .await
            .unwrap();
        s.recon
            .confirm("lab-2024", "A-100", "owner@x", Some("301".to_string()), None)
            .await
            .unwrap();

        let item = s
            .store
            .get_item(
                &s.store.get_inventory_by_name("lab-2024").await.unwrap().unwrap().id,
                "A-100",
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.recon.unwrap().found_room.as_deref(), Some("301"));

        let entries = s.audit.entries(&AuditFilter::default()).await.unwrap();
        let second_confirm = &entries[0];
        assert_eq!(second_confirm.action, stocktake_core::AuditAction::ItemReconciled);
        assert_eq!(
            second_confirm.details["previous"]["found_room"], "214",
            "overwritten stamp must be preserved in the audit trail"
        );
    }

    #[tokio::test]
    async fn confirm_requires_access() {
        let s = setup().await;
        let err = s
            .recon
            .confirm("lab-2024", "A-100", "stranger@x", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StocktakeError::Forbidden(_)));

        s.access.grant("lab-2024", "owner@x", "bob@x").await.unwrap();
        s.recon
            .confirm("lab-2024", "A-100", "bob@x", Some("214".to_string()), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn blank_found_room_leaves_item_pending() {
        let s = setup().await;
        let item = s
            .recon
            .confirm("lab-2024", "A-100", "owner@x", Some("   ".to_string()), None)
            .await
            .unwrap();
        assert_eq!(crate::classify(&item, false).state, ReconState::Pending);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let s = setup().await;
        let err = s
            .recon
            .confirm("lab-2024", "ghost", "owner@x", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StocktakeError::NotFound(_)));
    }
}
