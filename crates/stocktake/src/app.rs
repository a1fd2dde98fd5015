// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service wiring: one SQLite store shared by every service handle.

use std::sync::Arc;

use stocktake_access::AccessControl;
use stocktake_audit::AuditLog;
use stocktake_config::StocktakeConfig;
use stocktake_core::traits::InventoryStore;
use stocktake_core::StocktakeError;
use stocktake_corrections::CorrectionEngine;
use stocktake_inventory::InventoryService;
use stocktake_recon::Reconciliation;
use stocktake_storage::SqliteStore;

pub struct App {
    pub store: Arc<dyn InventoryStore>,
    pub access: AccessControl,
    pub audit: AuditLog,
    pub corrections: CorrectionEngine,
    pub recon: Reconciliation,
    pub inventory: InventoryService,
    sqlite: SqliteStore,
}

impl App {
    pub async fn open(config: &StocktakeConfig) -> Result<App, StocktakeError> {
        let sqlite = SqliteStore::open(&config.storage).await?;
        Ok(App::wire(sqlite))
    }

    pub fn wire(sqlite: SqliteStore) -> App {
        let store: Arc<dyn InventoryStore> = Arc::new(sqlite.clone());
        let audit = AuditLog::new(store.clone());
        let access = AccessControl::new(store.clone(), audit.clone());
        App {
            corrections: CorrectionEngine::new(store.clone(), access.clone(), audit.clone()),
            recon: Reconciliation::new(store.clone(), access.clone(), audit.clone()),
            inventory: InventoryService::new(store.clone(), access.clone(), audit.clone()),
            store,
            access,
            audit,
            sqlite,
        }
    }

    /// Flush the WAL before process exit.
    pub async fn close(&self) -> Result<(), StocktakeError> {
        self.sqlite.close().await
    }
}
