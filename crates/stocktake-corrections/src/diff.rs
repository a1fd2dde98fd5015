// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure correction algebra: the minimal trimmed diff and the effective-value
//! fold. No storage, no clocks.

use std::collections::BTreeMap;

use stocktake_core::fields::{trimmed, ItemFields};
use stocktake_core::{Correction, FieldChange};

/// The minimal trimmed diff between an item's original field set and a
/// submitted one.
///
/// A field is recorded only when the submitted value is non-blank after
/// trimming AND differs from the trimmed original. Blank submissions and
/// trim-equal resubmissions drop out, so whitespace noise never becomes
/// history.
pub fn diff_fields(
    original: &ItemFields,
    submitted: &ItemFields,
) -> BTreeMap<String, FieldChange> {
    let mut changes = BTreeMap::new();
    for name in original.field_names_with(submitted) {
        let Some(new) = trimmed(submitted.get(&name)) else {
            continue;
        };
        let before = trimmed(original.get(&name));
        if before == Some(new) {
            continue;
        }
        changes.insert(
            name,
            FieldChange {
                original: before.map(str::to_string),
                new: new.to_string(),
            },
        );
    }
    changes
}

/// Fold a correction history onto the original field set.
///
/// `history` must be oldest first (the store's ordering); the newest
/// correction of each field wins, falling back through older corrections to
/// the original. The result is derived at read time and never stored.
pub fn effective_fields(original: &ItemFields, history: &[Correction]) -> ItemFields {
    let mut effective = original.clone();
    for correction in history {
        for (name, change) in &correction.changed_fields {
            effective.set(name, change.new.clone());
        }
    }
    effective
}
