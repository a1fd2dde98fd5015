// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Stocktake reconciliation engine.

use thiserror::Error;

/// The primary error type used across all Stocktake services and the storage port.
///
/// The first five variants form the operation-level taxonomy returned to the
/// thin I/O layer; `Storage` wraps fatal backend faults (I/O, connectivity)
/// and is the only variant that represents an unexpected condition.
#[derive(Debug, Error)]
pub enum StocktakeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Identity resolved but lacks the required ownership or permission.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Inventory, item, user, or permission row absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation (duplicate grant, duplicate item number, duplicate inventory name).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed input (empty correction diff, self-grant, blank identifiers).
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StocktakeError {
    /// Wrap any backend error as a `Storage` fault.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StocktakeError::Storage {
            source: Box::new(source),
        }
    }

    /// True for the variants that map to a user-visible request failure
    /// rather than a backend fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StocktakeError::Forbidden(_)
                | StocktakeError::NotFound(_)
                | StocktakeError::Conflict(_)
                | StocktakeError::Invalid(_)
        )
    }
}
