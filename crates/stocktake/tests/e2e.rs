// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end walkthrough over the real SQLite store: import, delegation,
//! correction, reconciliation, revocation, and the audit trail.

use stocktake_core::fields::ItemFields;
use stocktake_core::{
    AccessDecision, AuditAction, AuditFilter, Identity, ItemRow, ReconState, StocktakeError,
};
use stocktake_storage::SqliteStore;

use stocktake::app::App;

fn identity(email: &str) -> Identity {
    Identity {
        email: email.to_string(),
        display_name: None,
    }
}

fn lab_rows() -> Vec<ItemRow> {
    vec![ItemRow {
        number: "100".to_string(),
        fields: ItemFields::from_pairs(vec![("ROOM", "A1"), ("STATUS", "Ativo")]),
    }]
}

async fn lab_app() -> App {
    let app = App::wire(SqliteStore::open_in_memory().await.unwrap());
    app.inventory
        .create(&identity("alice@x"), "lab-2024", "Lab 2024", lab_rows())
        .await
        .unwrap();
    app
}

#[tokio::test]
async fn lab_2024_walkthrough() {
    let app = lab_app().await;

    // Owner always has full access; bob starts with nothing.
    assert_eq!(
        app.access.check_access("lab-2024", "alice@x").await.unwrap(),
        AccessDecision::OWNER
    );
    assert_eq!(
        app.access.check_access("lab-2024", "bob@x").await.unwrap(),
        AccessDecision::DENIED
    );

    // Delegation.
    app.access.grant("lab-2024", "alice@x", "bob@x").await.unwrap();
    assert_eq!(
        app.access.check_access("lab-2024", "bob@x").await.unwrap(),
        AccessDecision {
            has_access: true,
            is_owner: false
        }
    );

    // Bob corrects the room; the original survives, history gains one entry.
    app.corrections
        .record(
            "lab-2024",
            "100",
            "bob@x",
            &ItemFields::from_pairs(vec![("ROOM", "A2")]),
            None,
        )
        .await
        .unwrap();
    let history = app.corrections.history("lab-2024", "100").await.unwrap();
    assert_eq!(history.len(), 1);
    let change = &history[0].changed_fields["ROOM"];
    assert_eq!(change.original.as_deref(), Some("A1"));
    assert_eq!(change.new, "A2");

    // Reconciliation in the corrected room: still "moved" relative to the
    // originally submitted A1.
    app.recon
        .confirm("lab-2024", "100", "bob@x", Some("A2".to_string()), None)
        .await
        .unwrap();
    let views = app
        .inventory
        .item_statuses("lab-2024", "alice@x")
        .await
        .unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].status.state, ReconState::FoundMoved);
    assert!(views[0].status.has_corrections);

    // Revocation ends bob's correction rights.
    app.access.revoke("lab-2024", "alice@x", "bob@x").await.unwrap();
    let err = app
        .corrections
        .record(
            "lab-2024",
            "100",
            "bob@x",
            &ItemFields::from_pairs(vec![("ROOM", "A3")]),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StocktakeError::Forbidden(_)));

    // The audit trail saw every step.
    let entries = app.audit.entries(&AuditFilter::default()).await.unwrap();
    let actions: Vec<AuditAction> = entries.iter().rev().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::InventoryCreated,
            AuditAction::PermissionGranted,
            AuditAction::CorrectionRecorded,
            AuditAction::ItemReconciled,
            AuditAction::InventoryViewed,
            AuditAction::PermissionRevoked,
            AuditAction::AccessDenied,
        ]
    );
}

#[tokio::test]
async fn walkthrough_registration_and_deletion() {
    let app = lab_app().await;

    app.inventory
        .register_item(
            "lab-2024",
            "alice@x",
            "900",
            ItemFields::from_pairs(vec![("ROOM", "B1")]),
        )
        .await
        .unwrap();
    let views = app
        .inventory
        .item_statuses("lab-2024", "alice@x")
        .await
        .unwrap();
    let registered = views.iter().find(|v| v.item.number == "900").unwrap();
    assert_eq!(
        registered.status.state,
        ReconState::RegisteredDuringReconciliation
    );

    app.inventory.delete("lab-2024", "alice@x").await.unwrap();
    assert!(app
        .store
        .get_inventory_by_name("lab-2024")
        .await
        .unwrap()
        .is_none());

    // The deletion record outlives the cascade.
    let entries = app.audit.entries(&AuditFilter::default()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::InventoryDeleted);
}

#[tokio::test]
async fn state_survives_reopen_of_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = stocktake_config::StorageConfig {
        database_path: dir.path().join("stocktake.db").display().to_string(),
        wal_mode: true,
    };

    {
        let app = App::wire(SqliteStore::open(&config).await.unwrap());
        app.inventory
            .create(&identity("alice@x"), "lab-2024", "", lab_rows())
            .await
            .unwrap();
        app.close().await.unwrap();
    }

    let app = App::wire(SqliteStore::open(&config).await.unwrap());
    let views = app
        .inventory
        .item_statuses("lab-2024", "alice@x")
        .await
        .unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].item.fields.get("ROOM"), Some("A1"));
    app.close().await.unwrap();
}

#[tokio::test]
async fn identity_resolution_is_idempotent_over_sqlite() {
    let app = App::wire(SqliteStore::open_in_memory().await.unwrap());
    let first = stocktake_access::resolve(&app.store, &identity("carol@x"))
        .await
        .unwrap();
    let second = stocktake_access::resolve(&app.store, &identity("carol@x"))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
}
