// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thin CSV ingestion: the stand-in for the external file ingester.
//!
//! One header row, one item per record. The column named by
//! `ingest.number_column` (compared case-insensitively) becomes the item
//! number; every other column lands in the item's field set.

use std::path::Path;

use stocktake_core::fields::ItemFields;
use stocktake_core::{ItemRow, StocktakeError};

use stocktake_config::IngestConfig;

pub fn read_rows(path: &Path, config: &IngestConfig) -> Result<Vec<ItemRow>, StocktakeError> {
    let delimiter = config.delimiter.bytes().next().unwrap_or(b',');
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| StocktakeError::Invalid(format!("cannot read {}: {e}", path.display())))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StocktakeError::Invalid(format!("bad header row: {e}")))?
        .iter()
        .map(|h| h.trim().to_uppercase())
        .collect();
    let number_column = config.number_column.trim().to_uppercase();
    let number_idx = headers
        .iter()
        .position(|h| *h == number_column)
        .ok_or_else(|| {
            StocktakeError::Invalid(format!("missing {number_column} column in header row"))
        })?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| StocktakeError::Invalid(format!("row {}: {e}", line + 2)))?;
        let number = record.get(number_idx).unwrap_or("").trim();
        if number.is_empty() {
            return Err(StocktakeError::Invalid(format!(
                "row {}: blank item number",
                line + 2
            )));
        }
        let fields = ItemFields::from_pairs(
            headers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != number_idx)
                .map(|(i, header)| (header.as_str(), record.get(i).unwrap_or("").to_string())),
        );
        rows.push(ItemRow {
            number: number.to_string(),
            fields,
        });
    }
    Ok(rows)
}
