//! Shared types used across the contract.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ContractError, ContractResult};

/// Key prefix shared by every record of one schema (e.g. `EMR`, `HOSO`).
///
/// Seed keys are `<namespace><index>` and the list-all range is
/// `<namespace><start> .. <namespace><end>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Create a namespace. Must be non-empty and free of whitespace.
    pub fn new(name: impl Into<String>) -> ContractResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ContractError::invalid_config("namespace must not be empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ContractError::invalid_config(format!(
                "namespace {:?} must not contain whitespace",
                name
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key for the seed record at `index`.
    pub fn seed_key(&self, index: usize) -> String {
        format!("{}{}", self.0, index)
    }

    /// Namespace-qualified key, `<namespace><suffix>`.
    pub fn key(&self, suffix: &str) -> String {
        format!("{}{}", self.0, suffix)
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Namespace::new(value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

/// Semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    pub fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Description of one invocable operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationInfo {
    /// Canonical operation name
    pub name: String,

    /// Namespace-qualified alias, if registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Human-readable description
    pub description: String,

    /// Names of the expected arguments, in order
    pub args: Vec<String>,
}

impl OperationInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            description: description.into(),
            args: vec![],
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

/// Unique identifier (UUID-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniqueId(pub Uuid);

impl UniqueId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UniqueId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
