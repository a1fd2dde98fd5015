// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-entity query modules. Free async functions over [`crate::Database`];
//! the [`crate::SqliteStore`] wrapper adapts them to the storage port.

pub mod audit;
pub mod corrections;
pub mod inventories;
pub mod items;
pub mod permissions;
pub mod users;
