// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure status classification. Total over every item shape; never fails.

use stocktake_core::fields::trimmed;
use stocktake_core::{Item, ItemStatus, ReconState};

/// Derive the display status of an item.
///
/// Ad-hoc registration wins over everything. A stamp classifies as found
/// in place or moved by comparing the found room against the item's
/// ORIGINAL room (corrections do not move the baseline). A stamp without
/// a found room is treated as not reconciled at all.
pub fn classify(item: &Item, has_corrections: bool) -> ItemStatus {
    let state = if item.registered_during_recon {
        ReconState::RegisteredDuringReconciliation
    } else {
        match item.recon.as_ref().and_then(|s| trimmed(s.found_room.as_deref())) {
            Some(found_room) => {
                if Some(found_room) == trimmed(item.fields.get("ROOM")) {
                    ReconState::FoundInPlace
                } else {
                    ReconState::FoundMoved
                }
            }
            None => ReconState::Pending,
        }
    };
    ItemStatus {
        state,
        has_corrections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktake_core::types::{new_id, now_iso};
    use stocktake_core::ReconStamp;
    use stocktake_test_utils::fixtures;

    fn stamped(room: &str, found: Option<&str>) -> Item {
        let mut item = fixtures::item("inv", "A-1", room);
        item.recon = Some(ReconStamp {
            found_room: found.map(str::to_string),
            found_status: None,
            reconciled_by: new_id(),
            reconciled_at: now_iso(),
        });
        item
    }

    #[test]
    fn unstamped_item_is_pending() {
        let item = fixtures::item("inv", "A-1", "214");
        assert_eq!(classify(&item, false).state, ReconState::Pending);
    }

    #[test]
    fn matching_room_is_found_in_place() {
        let item = stamped("214", Some(" 214 "));
        assert_eq!(classify(&item, false).state, ReconState::FoundInPlace);
    }

    #[test]
    fn different_room_is_found_moved() {
        let item = stamped("214", Some("301"));
        assert_eq!(classify(&item, false).state, ReconState::FoundMoved);
    }

    #[test]
    fn partial_stamp_degrades_to_pending() {
        let item = stamped("214", None);
        assert_eq!(classify(&item, false).state, ReconState::Pending);
    }

    #[test]
    fn registration_wins_over_stamp() {
        let mut item = stamped("214", Some("214"));
        item.registered_during_recon = true;
        assert_eq!(
            classify(&item, false).state,
            ReconState::RegisteredDuringReconciliation
        );
    }

    #[test]
    fn corrections_flag_is_orthogonal() {
        let item = stamped("214", Some("214"));
        let status = classify(&item, true);
        assert_eq!(status.state, ReconState::FoundInPlace);
        assert!(status.has_corrections);
    }

    #[test]
    fn item_without_original_room_counts_as_moved_when_found() {
        let mut item = fixtures::item("inv", "A-1", "214");
        item.fields.room = None;
        item.recon = Some(ReconStamp {
            found_room: Some("301".to_string()),
            found_status: None,
            reconciled_by: new_id(),
            reconciled_at: now_iso(),
        });
        assert_eq!(classify(&item, false).state, ReconState::FoundMoved);
    }
}
