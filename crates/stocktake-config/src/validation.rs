// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as known log levels and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::StocktakeConfig;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StocktakeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let level = config.log.level.trim().to_lowercase();
    if !VALID_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of: {}",
                config.log.level,
                VALID_LOG_LEVELS.join(", ")
            ),
        });
    }

    // CSV delimiters are single bytes.
    if config.ingest.delimiter.len() != 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "ingest.delimiter must be a single character, got `{}`",
                config.ingest.delimiter
            ),
        });
    }

    if config.ingest.number_column.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "ingest.number_column must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
