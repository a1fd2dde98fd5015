// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Port trait definitions. Services depend on these, never on a concrete
//! backend, so the SQLite store and the in-memory test fake are
//! interchangeable behind `Arc<dyn InventoryStore>`.

pub mod store;

pub use store::InventoryStore;
