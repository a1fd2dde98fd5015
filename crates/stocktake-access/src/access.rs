// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access control over inventories.
//!
//! Two privilege levels only: the single owner, and delegated users holding
//! an active permission row. Absence of anything (inventory, user, row) is
//! an ordinary denial, not an error; denials and every mutation land in the
//! audit log.

use std::sync::Arc;

use serde_json::json;
use stocktake_audit::AuditLog;
use stocktake_core::traits::InventoryStore;
use stocktake_core::types::{new_id, now_iso};
use stocktake_core::{
    AccessDecision, AuditAction, Inventory, Permission, PermissionGrant, StocktakeError, User,
};
use tracing::{debug, info};

#[derive(Clone)]
pub struct AccessControl {
    store: Arc<dyn InventoryStore>,
    audit: AuditLog,
}

impl AccessControl {
    pub fn new(store: Arc<dyn InventoryStore>, audit: AuditLog) -> AccessControl {
        AccessControl { store, audit }
    }

    /// The single owner predicate. Unknown inventory or user is `false`.
    pub async fn is_owner(
        &self,
        inventory_name: &str,
        email: &str,
    ) -> Result<bool, StocktakeError> {
        let Some(inventory) = self.store.get_inventory_by_name(inventory_name).await? else {
            return Ok(false);
        };
        let Some(user) = self.store.get_user_by_email(email).await? else {
            return Ok(false);
        };
        Ok(inventory.owner_id == user.id)
    }

    /// Full access decision: ownership implies access, otherwise the active
    /// flag of the permission row. Never errors on absence.
    pub async fn check_access(
        &self,
        inventory_name: &str,
        email: &str,
    ) -> Result<AccessDecision, StocktakeError> {
        let Some(inventory) = self.store.get_inventory_by_name(inventory_name).await? else {
            return Ok(AccessDecision::DENIED);
        };
        let Some(user) = self.store.get_user_by_email(email).await? else {
            return Ok(AccessDecision::DENIED);
        };
        if inventory.owner_id == user.id {
            return Ok(AccessDecision::OWNER);
        }
        let has_access = self
            .store
            .get_permission(&inventory.id, &user.id)
            .await?
            .map(|p| p.active)
            .unwrap_or(false);
        Ok(AccessDecision {
            has_access,
            is_owner: false,
        })
    }

    /// Grant delegated access. Owner-only; self-grants are rejected; an
    /// active grant is a Conflict; a revoked row is reactivated in place.
    pub async fn grant(
        &self,
        inventory_name: &str,
        granter_email: &str,
        grantee_email: &str,
    ) -> Result<Permission, StocktakeError> {
        let (inventory, granter) = self
            .require_owner(inventory_name, granter_email, "grant")
            .await?;
        // Lazy-create the grantee so access can be handed out ahead of
        // their first sign-in.
        let grantee = crate::identity::resolve(
            &self.store,
            &stocktake_core::Identity {
                email: grantee_email.to_string(),
                display_name: None,
            },
        )
        .await?;
        if grantee.id == inventory.owner_id {
            return Err(StocktakeError::Invalid(
                "owner already has access".to_string(),
            ));
        }

        if let Some(existing) = self.store.get_permission(&inventory.id, &grantee.id).await? {
            if existing.active {
                return Err(StocktakeError::Conflict(format!(
                    "{grantee_email} already has access to {inventory_name}"
                )));
            }
            // Soft-revoked row: reactivate instead of inserting a twin.
            self.store
                .set_permission_active(&inventory.id, &grantee.id, true)
                .await?;
            self.audit
                .record(
                    AuditAction::PermissionGranted,
                    &granter.id,
                    Some(&inventory.id),
                    json!({"grantee": grantee_email, "reactivated": true}),
                )
                .await;
            info!(inventory = inventory_name, grantee = grantee_email, "grant reactivated");
            return Ok(Permission {
                active: true,
                ..existing
            });
        }

        let permission = Permission {
            id: new_id(),
            inventory_id: inventory.id.clone(),
            user_id: grantee.id.clone(),
            active: true,
            granted_by: granter.id.clone(),
            granted_at: now_iso(),
        };
        // The unique (inventory, user) constraint decides concurrent grant
        // races; the loser surfaces Conflict.
        self.store.insert_permission(&permission).await?;
        self.audit
            .record(
                AuditAction::PermissionGranted,
                &granter.id,
                Some(&inventory.id),
                json!({"grantee": grantee_email}),
            )
            .await;
        info!(inventory = inventory_name, grantee = grantee_email, "access granted");
        Ok(permission)
    }

    /// Soft-revoke delegated access: the row stays, `active` flips off.
    pub async fn revoke(
        &self,
        inventory_name: &str,
        owner_email: &str,
        grantee_email: &str,
    ) -> Result<(), StocktakeError> {
        let (inventory, owner) = self
            .require_owner(inventory_name, owner_email, "revoke")
            .await?;
        let grantee = self
            .store
            .get_user_by_email(grantee_email)
            .await?
            .ok_or_else(|| StocktakeError::NotFound(format!("user {grantee_email}")))?;
        self.store
            .get_permission(&inventory.id, &grantee.id)
            .await?
            .ok_or_else(|| {
                StocktakeError::NotFound(format!(
                    "no grant for {grantee_email} on {inventory_name}"
                ))
            })?;
        self.store
            .set_permission_active(&inventory.id, &grantee.id, false)
            .await?;
        self.audit
            .record(
                AuditAction::PermissionRevoked,
                &owner.id,
                Some(&inventory.id),
                json!({"grantee": grantee_email}),
            )
            .await;
        info!(inventory = inventory_name, grantee = grantee_email, "access revoked");
        Ok(())
    }

    /// The owner's management view: every grant row, active or revoked,
    /// with the grantee identity embedded.
    pub async fn list_grants(
        &self,
        inventory_name: &str,
        owner_email: &str,
    ) -> Result<Vec<PermissionGrant>, StocktakeError> {
        let (inventory, _owner) = self
            .require_owner(inventory_name, owner_email, "list grants")
            .await?;
        self.store.list_permissions(&inventory.id).await
    }

    /// Shared owner gate for the mutating operations. A failed gate is
    /// audited as a denial before the Forbidden propagates.
    async fn require_owner(
        &self,
        inventory_name: &str,
        email: &str,
        operation: &str,
    ) -> Result<(Inventory, User), StocktakeError> {
        let inventory = self
            .store
            .get_inventory_by_name(inventory_name)
            .await?
            .ok_or_else(|| StocktakeError::NotFound(format!("inventory {inventory_name}")))?;
        let user = self.store.get_user_by_email(email).await?;
        match user {
            Some(user) if user.id == inventory.owner_id => Ok((inventory, user)),
            user => {
                let actor = user.map(|u| u.id).unwrap_or_else(|| email.to_string());
                self.audit
                    .record(
                        AuditAction::AccessDenied,
                        &actor,
                        Some(&inventory.id),
                        json!({"operation": operation, "email": email}),
                    )
                    .await;
                debug!(inventory = inventory_name, email, operation, "owner gate denied");
                Err(StocktakeError::Forbidden(format!(
                    "only the owner of {inventory_name} may {operation}"
                )))
            }
        }
    }
}
