//! Range aggregation.
//!
//! `queryAll` scans a namespace's key window and returns every record as
//! `[{"Key": <key>, "Record": <record>}, ...]` in ledger iteration order.
//! Each stored value is decoded into the schema and re-encoded, so the
//! array is always valid JSON; one malformed value fails the whole scan.

use serde::Serialize;
use std::sync::Arc;

use crate::errors::ContractResult;
use crate::ledger::{Ledger, ScanGuard};
use crate::schema::{Record, Schema};
use crate::types::Namespace;

/// Half-open key interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start: String,
    pub end: String,
}

impl KeyRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// `<namespace><start_suffix> .. <namespace><end_suffix>`
    pub fn for_namespace(namespace: &Namespace, start_suffix: &str, end_suffix: &str) -> Self {
        Self::new(namespace.key(start_suffix), namespace.key(end_suffix))
    }

    /// Would a scan of this range yield `key`?
    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && key < self.end.as_str()
    }
}

/// One element of the aggregated array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeEntry {
    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "Record")]
    pub record: Record,
}

/// Scan `range` and decode every value into `schema`.
///
/// The scan is closed exactly once whether this returns early on a ledger
/// error, fails on a malformed value, or completes.
pub fn collect_range(
    ledger: &dyn Ledger,
    range: &KeyRange,
    schema: &Arc<Schema>,
) -> ContractResult<Vec<RangeEntry>> {
    let mut scan = ScanGuard::new(ledger.state_by_range(&range.start, &range.end)?);

    let mut entries = Vec::new();
    for item in scan.by_ref() {
        let entry = item?;
        let record = Record::decode(schema.clone(), &entry.key, &entry.value)?;
        entries.push(RangeEntry {
            key: entry.key,
            record,
        });
    }

    scan.close()?;
    Ok(entries)
}

/// Encode entries as the compact JSON array returned by `queryAll`.
pub fn to_json_array(entries: &[RangeEntry]) -> ContractResult<Vec<u8>> {
    Ok(serde_json::to_vec(entries)?)
}
