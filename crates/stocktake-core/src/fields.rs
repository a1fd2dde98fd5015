// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The item field schema: a fixed set of known field names with typed
//! accessors plus an extra-fields bag for inventory-specific headers.
//!
//! Every field-level operation (correction diffing, effective-value
//! folding, CSV ingestion) goes through `get`/`set`/`field_names` so the
//! algorithms are total over known and extra fields alike.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical names of the known fields, in display order.
pub const KNOWN_FIELDS: [&str; 4] = ["STATUS", "DESCRIPTION", "ROOM", "VALUE"];

/// The original field set of one inventoried item.
///
/// Known fields are typed; anything else lands in `extra`, keyed by the
/// uppercased header name. Values are kept exactly as submitted -- trimming
/// happens at comparison time, never at storage time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    pub status: Option<String>,
    pub description: Option<String>,
    pub room: Option<String>,
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ItemFields {
    /// Look up a field by canonical name.
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "STATUS" => self.status.as_deref(),
            "DESCRIPTION" => self.description.as_deref(),
            "ROOM" => self.room.as_deref(),
            "VALUE" => self.value.as_deref(),
            other => self.extra.get(other).map(String::as_str),
        }
    }

    /// Set a field by canonical name. Unknown names go to the extra bag.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "STATUS" => self.status = Some(value),
            "DESCRIPTION" => self.description = Some(value),
            "ROOM" => self.room = Some(value),
            "VALUE" => self.value = Some(value),
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }

    /// All field names present in this set or known to the schema:
    /// known fields first in schema order, then extras in key order.
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = KNOWN_FIELDS.iter().map(|s| s.to_string()).collect();
        names.extend(self.extra.keys().cloned());
        names
    }

    /// Union of field names across this set and another, preserving the
    /// known-first ordering. Used by the diff so submitted-only extras
    /// are still compared.
    pub fn field_names_with(&self, other: &ItemFields) -> Vec<String> {
        let mut names = self.field_names();
        for key in other.extra.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
        names
    }

    /// Build a field set from `(header, value)` pairs. Headers are
    /// uppercased and trimmed; blank values are skipped entirely.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = ItemFields::default();
        for (header, value) in pairs {
            let name = header.as_ref().trim().to_uppercase();
            let value: String = value.into();
            if name.is_empty() || value.trim().is_empty() {
                continue;
            }
            fields.set(&name, value);
        }
        fields
    }

    /// True if no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.description.is_none()
            && self.room.is_none()
            && self.value.is_none()
            && self.extra.is_empty()
    }
}

/// A value that is present and non-blank after trimming, or `None`.
pub fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_known_fields() {
        let mut fields = ItemFields::default();
        fields.set("ROOM", "A1".to_string());
        fields.set("STATUS", "Ativo".to_string());
        assert_eq!(fields.get("ROOM"), Some("A1"));
        assert_eq!(fields.get("STATUS"), Some("Ativo"));
        assert_eq!(fields.get("DESCRIPTION"), None);
    }

    #[test]
    fn unknown_fields_go_to_extra_bag() {
        let mut fields = ItemFields::default();
        fields.set("SERIAL", "SN-42".to_string());
        assert_eq!(fields.get("SERIAL"), Some("SN-42"));
        assert_eq!(fields.extra.len(), 1);
    }

    #[test]
    fn field_names_known_first_then_extras_sorted() {
        let mut fields = ItemFields::default();
        fields.set("ZONE", "east".to_string());
        fields.set("BRAND", "Acme".to_string());
        let names = fields.field_names();
        assert_eq!(
            names,
            vec!["STATUS", "DESCRIPTION", "ROOM", "VALUE", "BRAND", "ZONE"]
        );
    }

    #[test]
    fn from_pairs_normalizes_headers_and_skips_blanks() {
        let fields = ItemFields::from_pairs(vec![
            ("  room ", "A1"),
            ("Status", "Ativo"),
            ("Serial", "   "),
            ("", "orphan"),
        ]);
        assert_eq!(fields.room.as_deref(), Some("A1"));
        assert_eq!(fields.status.as_deref(), Some("Ativo"));
        assert!(fields.extra.is_empty());
    }

    #[test]
    fn field_names_with_includes_submitted_only_extras() {
        let original = ItemFields::from_pairs(vec![("ROOM", "A1")]);
        let submitted = ItemFields::from_pairs(vec![("SERIAL", "SN-1")]);
        let names = original.field_names_with(&submitted);
        assert!(names.contains(&"SERIAL".to_string()));
        assert!(names.contains(&"ROOM".to_string()));
    }

    #[test]
    fn trimmed_filters_blank_values() {
        assert_eq!(trimmed(Some("  A1 ")), Some("A1"));
        assert_eq!(trimmed(Some("   ")), None);
        assert_eq!(trimmed(None), None);
    }

    #[test]
    fn serde_roundtrip() {
        let mut fields = ItemFields::from_pairs(vec![("ROOM", "A1"), ("SERIAL", "SN-1")]);
        fields.set("VALUE", "120.50".to_string());
        let json = serde_json::to_string(&fields).unwrap();
        let back: ItemFields = serde_json::from_str(&json).unwrap();
        assert_eq!(fields, back);
    }
}
