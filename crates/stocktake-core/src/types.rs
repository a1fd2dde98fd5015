// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types shared across the Stocktake workspace.
//!
//! Timestamps are ISO-8601 millisecond strings (the storage layer's TEXT
//! convention); identifiers are UUID v4 strings assigned at creation time.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::fields::ItemFields;

/// Current time as an ISO-8601 millisecond UTC string.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fresh UUID v4 identifier string.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// An externally-authenticated identity handed in by the sign-in subsystem.
///
/// The core never authenticates; absence of an identity is the caller's
/// problem. This carries exactly what the identity provider supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub display_name: Option<String>,
}

/// An internal user record, created lazily on first authenticated contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
}

/// A named collection of asset items created from one ingested file.
///
/// `name` is unique and immutable after creation; `owner_id` is the single
/// exclusive owner, distinct from delegated permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub owner_id: String,
    pub created_at: String,
}

/// A delegated, revocable access grant for a non-owner user.
///
/// Unique per `(inventory_id, user_id)`. Revocation flips `active` rather
/// than deleting the row, preserving who-granted-when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub inventory_id: String,
    pub user_id: String,
    pub active: bool,
    pub granted_by: String,
    pub granted_at: String,
}

/// A permission row with the grantee's identity embedded, for the owner's
/// management view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub permission: Permission,
    pub grantee: User,
}

/// Reconciliation stamp set when an item is physically confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconStamp {
    pub found_room: Option<String>,
    pub found_status: Option<String>,
    pub reconciled_by: String,
    pub reconciled_at: String,
}

/// One physical asset row within an inventory, identified by its number.
///
/// `fields` holds the original submission and is never mutated in place;
/// corrections live in a parallel append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub inventory_id: String,
    pub number: String,
    pub fields: ItemFields,
    pub registered_during_recon: bool,
    pub recon: Option<ReconStamp>,
    pub created_at: String,
}

/// One parsed row from the external file ingester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    pub number: String,
    pub fields: ItemFields,
}

/// A single field-level change inside a correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// The trimmed original value, or `None` if the field was blank.
    pub original: Option<String>,
    /// The trimmed submitted value. Always non-blank.
    pub new: String,
}

/// One correction event for an item. Append-only: multiple corrections for
/// the same item number form the full edit history, ordered by `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub id: String,
    pub inventory_id: String,
    pub item_number: String,
    pub changed_fields: BTreeMap<String, FieldChange>,
    pub corrected_by: String,
    pub note: Option<String>,
    pub created_at: String,
}

/// The answer to "can user X touch inventory Y".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub has_access: bool,
    pub is_owner: bool,
}

impl AccessDecision {
    pub const DENIED: AccessDecision = AccessDecision {
        has_access: false,
        is_owner: false,
    };

    pub const OWNER: AccessDecision = AccessDecision {
        has_access: true,
        is_owner: true,
    };
}

/// Kinds of auditable events, covering both security decisions and
/// business mutations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    AccessDenied,
    InventoryCreated,
    InventoryDeleted,
    InventoryViewed,
    PermissionGranted,
    PermissionRevoked,
    CorrectionRecorded,
    ItemRegistered,
    ItemReconciled,
}

/// An immutable audit record. `id` is the store-assigned row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub action: AuditAction,
    pub user_id: String,
    pub inventory_id: Option<String>,
    pub details: serde_json::Value,
    pub created_at: String,
}

/// Filter for audit queries. Empty filter returns everything, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub inventory_id: Option<String>,
    pub user_id: Option<String>,
    pub limit: Option<i64>,
}

/// The derived reconciliation state of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconState {
    /// No reconciliation stamp (or a partial one).
    Pending,
    /// Reconciled and found in its originally submitted room.
    FoundInPlace,
    /// Reconciled but found in a different room.
    FoundMoved,
    /// Registered ad hoc during the walkthrough, no prior submission.
    RegisteredDuringReconciliation,
}

impl std::fmt::Display for ReconState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconState::Pending => write!(f, "pending"),
            ReconState::FoundInPlace => write!(f, "found in place"),
            ReconState::FoundMoved => write!(f, "found moved"),
            ReconState::RegisteredDuringReconciliation => {
                write!(f, "registered during reconciliation")
            }
        }
    }
}

/// Per-item display status: the derived state plus the orthogonal
/// has-corrections flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStatus {
    pub state: ReconState,
    pub has_corrections: bool,
}
