// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Stocktake reconciliation engine.
//!
//! This crate provides the error taxonomy, domain model types, the item
//! field schema, and the storage port trait used throughout the Stocktake
//! workspace. Backends and services implement against what is defined here.

pub mod error;
pub mod fields;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StocktakeError;
pub use fields::{ItemFields, KNOWN_FIELDS};
pub use traits::InventoryStore;
pub use types::{
    AccessDecision, AuditAction, AuditEntry, AuditFilter, Correction, FieldChange, Identity,
    Inventory, Item, ItemRow, ItemStatus, Permission, PermissionGrant, ReconStamp, ReconState,
    User,
};
