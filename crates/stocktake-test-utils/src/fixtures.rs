// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture builders shared by the service test suites.

use stocktake_core::fields::ItemFields;
use stocktake_core::types::{new_id, now_iso};
use stocktake_core::{Identity, Inventory, Item, ItemRow, User};

pub fn identity(email: &str) -> Identity {
    Identity {
        email: email.to_string(),
        display_name: Some(email.split('@').next().unwrap_or(email).to_string()),
    }
}

pub fn user(email: &str) -> User {
    User {
        id: new_id(),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
        created_at: now_iso(),
    }
}

pub fn inventory(name: &str, owner_id: &str) -> Inventory {
    Inventory {
        id: new_id(),
        name: name.to_string(),
        display_name: name.to_string(),
        owner_id: owner_id.to_string(),
        created_at: now_iso(),
    }
}

pub fn item(inventory_id: &str, number: &str, room: &str) -> Item {
    Item {
        id: new_id(),
        inventory_id: inventory_id.to_string(),
        number: number.to_string(),
        fields: fields(room),
        registered_during_recon: false,
        recon: None,
        created_at: now_iso(),
    }
}

pub fn item_row(number: &str, room: &str) -> ItemRow {
    ItemRow {
        number: number.to_string(),
        fields: fields(room),
    }
}

fn fields(room: &str) -> ItemFields {
    ItemFields::from_pairs(vec![
        ("ROOM", room),
        ("DESCRIPTION", "test asset"),
        ("STATUS", "in use"),
    ])
}
