// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Library surface of the CLI crate: service wiring and CSV ingestion,
//! shared between the binary and the integration tests.

pub mod app;
pub mod ingest;
