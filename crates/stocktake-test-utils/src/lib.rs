// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test support for the Stocktake workspace: an in-memory storage port fake
//! plus fixture builders.

pub mod fixtures;
pub mod store;

pub use store::MemoryStore;
