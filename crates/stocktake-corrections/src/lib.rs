// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correction tracking for Stocktake: minimal trimmed diffs appended to an
//! immutable history, with effective values derived at read time.

pub mod diff;
pub mod engine;

pub use diff::{diff_fields, effective_fields};
pub use engine::CorrectionEngine;
