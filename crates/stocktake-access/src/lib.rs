// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity resolution and inventory access control for Stocktake.

pub mod access;
pub mod identity;

pub use access::AccessControl;
pub use identity::resolve;
