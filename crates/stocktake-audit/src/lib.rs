// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only audit trail over the storage port.
//!
//! Writes are best-effort: a failed append must never fail the business
//! operation it describes, so [`AuditLog::record`] logs and counts the
//! failure instead of propagating it. Reads go straight to the store.

use std::sync::Arc;

use metrics::counter;
use stocktake_core::traits::InventoryStore;
use stocktake_core::{AuditAction, AuditEntry, AuditFilter, StocktakeError};
use tracing::warn;

pub const AUDIT_APPENDED: &str = "stocktake_audit_entries_appended_total";
pub const AUDIT_DROPPED: &str = "stocktake_audit_entries_dropped_total";

/// Audit log handle shared by all services.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn InventoryStore>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn InventoryStore>) -> AuditLog {
        AuditLog { store }
    }

    /// Append an entry. Infallible by contract: storage faults are logged
    /// with `warn!` and counted, never returned.
    pub async fn record(
        &self,
        action: AuditAction,
        user_id: &str,
        inventory_id: Option<&str>,
        details: serde_json::Value,
    ) {
        match self
            .store
            .append_audit(action, user_id, inventory_id, &details)
            .await
        {
            Ok(_) => {
                counter!(AUDIT_APPENDED).increment(1);
            }
            Err(e) => {
                counter!(AUDIT_DROPPED).increment(1);
                warn!(%action, user_id, ?inventory_id, error = %e, "audit entry dropped");
            }
        }
    }

    /// Entries matching the filter, newest first.
    pub async fn entries(
        &self,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditEntry>, StocktakeError> {
        self.store.list_audit(filter).await
    }
}
