// src/models/reference.rs

use serde::{Deserialize, Serialize};

// Read-only reference snapshots used to populate pickers and to resolve
// display names to remote lookup ids. Fetched once per session through the
// lookup cache.

/// A district, carrying its resolved province so that district → province
/// derivation needs no second round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: String,
    pub name: String,
    pub province_id: Option<String>,
    pub province_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    pub id: String,
    pub name: String,
    /// At most one supervisor per province.
    pub supervisor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub department: Option<String>,
    pub province_id: Option<String>,
}

/// One option of a remote choice (optionset) attribute: integer code plus
/// human-readable label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub value: i64,
    pub label: String,
}
