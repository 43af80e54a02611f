//! Seed fixtures for `initLedger`.
//!
//! Seed data is configuration, not code: a fixture is a JSON document naming
//! the schema it targets and listing the records in seed order. Record `i`
//! is written to `<namespace><i>`.
//!
//! ```json
//! {
//!   "schema": "exam_record",
//!   "records": [
//!     { "mabn": "2020083198", "hoten": "...", "ngaysinh": "...", ... }
//!   ]
//! }
//! ```
//!
//! Fixtures are validated strictly: every record must be an object holding
//! exactly the schema's fields, all strings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::errors::{ContractError, ContractResult};
use crate::schema::{Record, Schema};

/// Built-in exam-record seed (three records).
pub const EXAM_RECORD_SEED: &str = include_str!("../fixtures/exam_record_seed.json");

/// Built-in case-file seed (three records).
pub const CASE_FILE_SEED: &str = include_str!("../fixtures/case_file_seed.json");

/// A seed document as read from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFixture {
    /// Name of the schema the records belong to
    pub schema: String,

    /// Records in seed order
    #[serde(default)]
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl SeedFixture {
    /// Parse a fixture from a JSON string
    pub fn from_json_str(json: &str) -> ContractResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ContractError::invalid_fixture(format!("fixture is not valid JSON: {}", e)))
    }

    /// Read and parse a fixture file
    pub fn read_file(path: &Path) -> ContractResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            ContractError::invalid_fixture(format!(
                "failed to read fixture {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&data)
    }

    /// The built-in exam-record seed
    pub fn exam_records() -> ContractResult<Self> {
        Self::from_json_str(EXAM_RECORD_SEED)
    }

    /// The built-in case-file seed
    pub fn case_files() -> ContractResult<Self> {
        Self::from_json_str(CASE_FILE_SEED)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the fixture has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validate against `schema` and produce typed records in seed order.
    pub fn into_records(self, schema: &Arc<Schema>) -> ContractResult<Vec<Record>> {
        if self.schema != schema.name() {
            return Err(ContractError::invalid_fixture(format!(
                "fixture targets schema {}, contract uses {}",
                self.schema,
                schema.name()
            )));
        }

        self.records
            .into_iter()
            .enumerate()
            .map(|(i, object)| seed_record(schema, i, object))
            .collect()
    }
}

fn seed_record(
    schema: &Arc<Schema>,
    index: usize,
    object: serde_json::Map<String, serde_json::Value>,
) -> ContractResult<Record> {
    if let Some(unknown) = object.keys().find(|k| schema.index_of(k).is_none()) {
        return Err(ContractError::invalid_fixture(format!(
            "seed record {} has unknown field {}",
            index, unknown
        )));
    }

    let mut values = Vec::with_capacity(schema.field_count());
    for field in schema.fields() {
        match object.get(field) {
            Some(serde_json::Value::String(s)) => values.push(s.clone()),
            Some(_) => {
                return Err(ContractError::invalid_fixture(format!(
                    "seed record {} field {} must be a string",
                    index, field
                )))
            }
            None => {
                return Err(ContractError::invalid_fixture(format!(
                    "seed record {} is missing field {}",
                    index, field
                )))
            }
        }
    }

    Record::from_values(schema.clone(), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_exam_seed() {
        let schema = Arc::new(Schema::exam_record());
        let records = SeedFixture::exam_records()
            .unwrap()
            .into_records(&schema)
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("mabn"), Some("2020083198"));
        assert_eq!(records[2].get("mabn"), Some("2020083154"));
        assert_eq!(records[2].get("ngaysinh"), Some("01/01/1951"));
    }

    #[test]
    fn test_builtin_case_file_seed() {
        let schema = Arc::new(Schema::case_file());
        let records = SeedFixture::case_files()
            .unwrap()
            .into_records(&schema)
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].get("malk"), Some("92004_2020083124_2008040080"));
        assert_eq!(records[0].get("gioitinh"), Some("Nữ "));

        // Embedded medication lists are stored as JSON text
        let thuoc = records[0].get("thuoc").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(thuoc).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let schema = Arc::new(Schema::case_file());
        let err = SeedFixture::exam_records()
            .unwrap()
            .into_records(&schema)
            .unwrap_err();
        assert!(err.message.contains("exam_record"));
    }

    #[test]
    fn test_strict_record_validation() {
        let schema = Arc::new(
            Schema::new("pair", vec!["a".into(), "b".into()], "b").unwrap(),
        );

        let missing = SeedFixture::from_json_str(r#"{"schema":"pair","records":[{"a":"1"}]}"#)
            .unwrap();
        assert!(missing.into_records(&schema).is_err());

        let unknown = SeedFixture::from_json_str(
            r#"{"schema":"pair","records":[{"a":"1","b":"2","c":"3"}]}"#,
        )
        .unwrap();
        assert!(unknown.into_records(&schema).is_err());

        let typed = SeedFixture::from_json_str(r#"{"schema":"pair","records":[{"a":"1","b":2}]}"#)
            .unwrap();
        assert!(typed.into_records(&schema).is_err());
    }

    #[test]
    fn test_invalid_json() {
        let err = SeedFixture::from_json_str("{").unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::InvalidFixture);
    }
}
