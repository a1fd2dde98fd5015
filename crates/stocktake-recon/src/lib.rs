// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation walkthrough support: access-gated confirmation stamps and
//! the pure status classifier.

pub mod classify;
pub mod confirm;

pub use classify::classify;
pub use confirm::Reconciliation;
