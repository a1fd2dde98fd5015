// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inventory lifecycle service for Stocktake.

pub mod service;

pub use service::{InventoryService, ItemView};
