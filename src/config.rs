//! Contract configuration.
//!
//! A config names the key namespace and, optionally, a custom schema and
//! seed fixture. Anything left unset falls back to the built-in instance
//! matching the namespace (`EMR` → exam records, `HOSO` → case files).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{ContractError, ContractResult};
use crate::fixture::SeedFixture;
use crate::schema::Schema;

/// Default first suffix of the list-all range (inclusive).
pub const DEFAULT_RANGE_START: &str = "0";

/// Default last suffix of the list-all range (exclusive).
pub const DEFAULT_RANGE_END: &str = "999";

/// Largest accepted event buffer. The broadcast channel allocates every slot
/// up front.
pub const MAX_EVENT_CAPACITY: usize = 65_536;

/// Configuration for building a `RecordContract`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Key prefix for seed keys and the list-all range
    pub namespace: String,

    /// Custom schema. None = built-in schema for the namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    /// Inclusive start suffix of the list-all range
    #[serde(default = "default_range_start")]
    pub range_start: String,

    /// Exclusive end suffix of the list-all range
    #[serde(default = "default_range_end")]
    pub range_end: String,

    /// Seed fixture file. Takes precedence over `seed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_path: Option<PathBuf>,

    /// Inline seed fixture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<SeedFixture>,

    /// Also register `query<NS>`, `create<NS>`, `queryAll<NS>`, `change<NS>`
    #[serde(default = "default_true")]
    pub legacy_operation_names: bool,

    /// Buffered event capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Custom options (deployment-specific)
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

fn default_range_start() -> String {
    DEFAULT_RANGE_START.to_string()
}

fn default_range_end() -> String {
    DEFAULT_RANGE_END.to_string()
}

fn default_true() -> bool {
    true
}

fn default_event_capacity() -> usize {
    256
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            namespace: "EMR".to_string(),
            schema: None,
            range_start: default_range_start(),
            range_end: default_range_end(),
            seed_path: None,
            seed: None,
            legacy_operation_names: true,
            event_capacity: default_event_capacity(),
            options: HashMap::new(),
        }
    }
}

impl ContractConfig {
    /// Create a config for a namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// The exam-record instance (`EMR`)
    pub fn exam_records() -> Self {
        Self::new("EMR")
    }

    /// The case-file instance (`HOSO`)
    pub fn case_files() -> Self {
        Self::new("HOSO")
    }

    /// Parse a config from JSON
    pub fn from_json_str(json: &str) -> ContractResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ContractError::invalid_config(format!("invalid contract config: {}", e)))
    }

    /// Read a JSON config file
    pub fn read_file(path: &Path) -> ContractResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Use a custom schema
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set the list-all range suffixes
    pub fn range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.range_start = start.into();
        self.range_end = end.into();
        self
    }

    /// Load seed data from a fixture file
    pub fn seed_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(path.into());
        self
    }

    /// Use an inline seed fixture
    pub fn seed(mut self, fixture: SeedFixture) -> Self {
        self.seed = Some(fixture);
        self
    }

    /// Enable or disable the namespace-qualified operation names
    pub fn legacy_operation_names(mut self, enabled: bool) -> Self {
        self.legacy_operation_names = enabled;
        self
    }

    /// Set event buffer capacity
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Add a custom option
    pub fn option(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.options.insert(key.into(), v);
        }
        self
    }

    /// Get a custom option
    pub fn get_option<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Schema to use: the configured one, else the built-in for the namespace.
    pub fn resolve_schema(&self) -> ContractResult<Schema> {
        if let Some(schema) = &self.schema {
            return Ok(schema.clone());
        }
        match self.namespace.as_str() {
            "EMR" => Ok(Schema::exam_record()),
            "HOSO" => Ok(Schema::case_file()),
            other => Err(ContractError::invalid_config(format!(
                "namespace {} has no built-in schema; configure one",
                other
            ))),
        }
    }

    /// Seed fixture to use: file, then inline, then the built-in for the
    /// namespace, else an empty seed for the schema.
    pub fn resolve_seed(&self, schema: &Schema) -> ContractResult<SeedFixture> {
        if let Some(path) = &self.seed_path {
            return SeedFixture::read_file(path);
        }
        if let Some(seed) = &self.seed {
            return Ok(seed.clone());
        }
        if self.schema.is_none() {
            match self.namespace.as_str() {
                "EMR" => return SeedFixture::exam_records(),
                "HOSO" => return SeedFixture::case_files(),
                _ => {}
            }
        }
        Ok(SeedFixture {
            schema: schema.name().to_string(),
            records: vec![],
        })
    }

    /// Check the range bounds form a non-empty interval and the event
    /// capacity is within `1..=MAX_EVENT_CAPACITY`.
    pub fn validate(&self) -> ContractResult<()> {
        if self.range_start >= self.range_end {
            return Err(ContractError::invalid_config(format!(
                "range start {:?} must sort before range end {:?}",
                self.range_start, self.range_end
            )));
        }
        if self.event_capacity == 0 {
            return Err(ContractError::invalid_config(
                "event capacity must be greater than zero",
            ));
        }
        if self.event_capacity > MAX_EVENT_CAPACITY {
            return Err(ContractError::invalid_config(format!(
                "event capacity {} exceeds the maximum of {}",
                self.event_capacity, MAX_EVENT_CAPACITY
            )));
        }
        Ok(())
    }
}
