//! Confirmation log entries written to the remote `conferencias` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::LotRef;

/// One confirmation event: a single scanned unit or a confirmed batch.
///
/// Field names follow the remote table's columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationRecord {
    #[serde(rename = "documento")]
    pub document: String,
    #[serde(rename = "codigo_item")]
    pub item: String,
    #[serde(rename = "lote")]
    pub lot: String,
    /// Expected units for the whole item+lot group.
    #[serde(rename = "quantidade_esperada")]
    pub expected: u32,
    /// Units confirmed by this event.
    #[serde(rename = "quantidade_conferida")]
    pub checked: u32,
    /// Owner id of the selected client.
    #[serde(rename = "cliente")]
    pub client: String,
    /// ISO 8601 timestamp string.
    #[serde(rename = "data")]
    pub recorded_at: String,
}

impl ConfirmationRecord {
    pub fn new(
        document: &str,
        lot_ref: &LotRef,
        expected: u32,
        checked: u32,
        client: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            document: document.to_string(),
            item: lot_ref.item.clone(),
            lot: lot_ref.lot.clone(),
            expected,
            checked,
            client: client.to_string(),
            recorded_at: at.to_rfc3339(),
        }
    }
}
