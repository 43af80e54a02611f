//! Record schemas and the record codec.
//!
//! A [`Schema`] is an ordered list of string field names plus the one field
//! that `update` rewrites. A [`Record`] is a full set of values for a schema,
//! always persisted as a compact JSON object with members in schema order.
//!
//! Decoding is lenient about *missing* members (they become empty strings)
//! and about unknown members (ignored), but anything that is not a JSON
//! object of strings is rejected as malformed.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::sync::Arc;

use crate::errors::{ContractError, ContractResult};

/// Fields of the exam-visit record, in storage order.
pub const EXAM_RECORD_FIELDS: [&str; 6] =
    ["mabn", "hoten", "ngaysinh", "gioitinh", "cmnd", "diachi"];

/// Fields of the case-file record, in storage order.
pub const CASE_FILE_FIELDS: [&str; 22] = [
    "malk",
    "mabn",
    "maba",
    "makb",
    "hoten",
    "ngaysinh",
    "gioitinh",
    "cmnd",
    "mathe",
    "diachi",
    "maicd",
    "chandoan",
    "ghichu",
    "lydo",
    "mabs",
    "tenbs",
    "mach",
    "nhietdo",
    "huyetap",
    "cannang",
    "thuoc",
    "canlamsang",
];

/// Patient full-name field, the one `update` rewrites in both shipped schemas.
pub const FULL_NAME_FIELD: &str = "hoten";

/// Fixed, ordered set of named string fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef", into = "SchemaDef")]
pub struct Schema {
    name: String,
    fields: Vec<String>,
    display_field: String,
    display_index: usize,
}

/// Wire form of a schema definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchemaDef {
    name: String,
    fields: Vec<String>,
    display_field: String,
}

impl Schema {
    /// Create and validate a schema.
    ///
    /// Fields must be non-empty and unique, and `display_field` must be one
    /// of them.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<String>,
        display_field: impl Into<String>,
    ) -> ContractResult<Self> {
        let name = name.into();
        let display_field = display_field.into();

        if fields.is_empty() {
            return Err(ContractError::invalid_schema(format!(
                "schema {} has no fields",
                name
            )));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.is_empty() {
                return Err(ContractError::invalid_schema(format!(
                    "schema {} has an empty field name",
                    name
                )));
            }
            if !seen.insert(field.as_str()) {
                return Err(ContractError::invalid_schema(format!(
                    "schema {} declares field {} twice",
                    name, field
                )));
            }
        }

        let display_index = fields
            .iter()
            .position(|f| *f == display_field)
            .ok_or_else(|| {
                ContractError::invalid_schema(format!(
                    "display field {} is not a field of schema {}",
                    display_field, name
                ))
            })?;

        Ok(Self {
            name,
            fields,
            display_field,
            display_index,
        })
    }

    /// The six-field exam-visit schema (namespace `EMR`).
    pub fn exam_record() -> Self {
        Self::builtin("exam_record", &EXAM_RECORD_FIELDS)
    }

    /// The twenty-two-field case-file schema (namespace `HOSO`).
    pub fn case_file() -> Self {
        Self::builtin("case_file", &CASE_FILE_FIELDS)
    }

    fn builtin(name: &str, fields: &[&str]) -> Self {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        let display_index = fields
            .iter()
            .position(|f| f == FULL_NAME_FIELD)
            .unwrap_or(0);
        Self {
            name: name.to_string(),
            fields,
            display_field: FULL_NAME_FIELD.to_string(),
            display_index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn display_field(&self) -> &str {
        &self.display_field
    }

    /// Position of a field, if the schema has it
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }
}

impl TryFrom<SchemaDef> for Schema {
    type Error = ContractError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        Schema::new(def.name, def.fields, def.display_field)
    }
}

impl From<Schema> for SchemaDef {
    fn from(schema: Schema) -> Self {
        Self {
            name: schema.name,
            fields: schema.fields,
            display_field: schema.display_field,
        }
    }
}

/// A complete set of field values for one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<String>,
}

impl Record {
    /// Build a record positionally from exactly one value per field.
    pub fn from_values(schema: Arc<Schema>, values: Vec<String>) -> ContractResult<Self> {
        if values.len() != schema.field_count() {
            return Err(ContractError::invalid_schema(format!(
                "schema {} expects {} values, got {}",
                schema.name(),
                schema.field_count(),
                values.len()
            )));
        }
        Ok(Self { schema, values })
    }

    /// A record with every field set to the empty string.
    pub fn empty(schema: Arc<Schema>) -> Self {
        let values = vec![String::new(); schema.field_count()];
        Self { schema, values }
    }

    /// Decode stored bytes. `key` is only used in error messages.
    pub fn decode(schema: Arc<Schema>, key: &str, bytes: &[u8]) -> ContractResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| ContractError::malformed_record(key, e))?;
        Self::from_json(schema, key, &value)
    }

    /// Build a record from an already parsed JSON value.
    pub fn from_json(
        schema: Arc<Schema>,
        key: &str,
        value: &serde_json::Value,
    ) -> ContractResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ContractError::malformed_record(key, "expected a JSON object"))?;

        let mut values = Vec::with_capacity(schema.field_count());
        for field in schema.fields() {
            let v = match object.get(field) {
                None | Some(serde_json::Value::Null) => String::new(),
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => {
                    return Err(ContractError::malformed_record(
                        key,
                        format!("field {} must be a string, found {}", field, other),
                    ))
                }
            };
            values.push(v);
        }

        Ok(Self { schema, values })
    }

    /// Encode to the persisted JSON form.
    pub fn encode(&self) -> ContractResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value of a named field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.schema
            .index_of(field)
            .map(|i| self.values[i].as_str())
    }

    /// Value of the display-name field
    pub fn display_name(&self) -> &str {
        &self.values[self.schema.display_index]
    }

    /// Copy of this record with the display-name field replaced.
    pub fn with_display_name(&self, name: impl Into<String>) -> Self {
        let mut values = self.values.clone();
        values[self.schema.display_index] = name.into();
        Self {
            schema: self.schema.clone(),
            values,
        }
    }

    /// `(field, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schema
            .fields()
            .iter()
            .zip(self.values.iter())
            .map(|(f, v)| (f.as_str(), v.as_str()))
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}
