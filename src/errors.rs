//! Standard error types for the record contract.
//!
//! Two error layers:
//!
//! 1. **ProtocolError** — request/routing errors (unknown function name,
//!    wrong argument count, unparseable request). Raised before any ledger
//!    access happens.
//!
//! 2. **ContractError** — domain errors raised while an operation runs
//!    (ledger failure, malformed stored record, bad schema or fixture).
//!
//! Both collapse into a `Response::Failure` at the invocation boundary,
//! which carries only the human-readable message.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::ledger::LedgerError;

// ═══════════════════════════════════════════════════════════════════
// LAYER 1: Protocol errors (routing / argument validation)
// ═══════════════════════════════════════════════════════════════════

/// Protocol error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolErrorCode {
    /// No operation is registered under the requested name
    UnknownFunction,

    /// Wrong number of arguments for the operation
    InvalidArity,

    /// The request itself could not be understood
    InvalidRequest,
}

impl std::fmt::Display for ProtocolErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFunction => write!(f, "UNKNOWN_FUNCTION"),
            Self::InvalidArity => write!(f, "INVALID_ARITY"),
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
        }
    }
}

/// Request-level error. No side effects have happened when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProtocolError {
    /// Error code
    pub code: ProtocolErrorCode,

    /// Human-readable error message
    pub message: String,
}

impl ProtocolError {
    /// Create a new protocol error
    pub fn new(code: ProtocolErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Unknown operation name
    pub fn unknown_function(name: &str) -> Self {
        Self::new(
            ProtocolErrorCode::UnknownFunction,
            format!("Invalid function name: {}", name),
        )
    }

    /// Wrong argument count
    pub fn invalid_arity(expected: usize, got: usize) -> Self {
        Self::new(
            ProtocolErrorCode::InvalidArity,
            format!(
                "Incorrect number of arguments. Expecting {} (got {})",
                expected, got
            ),
        )
    }

    /// Malformed request
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorCode::InvalidRequest, message)
    }
}

// ═══════════════════════════════════════════════════════════════════
// LAYER 2: Domain errors
// ═══════════════════════════════════════════════════════════════════

/// Domain error raised while an operation executes.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct ContractError {
    /// Error code (machine-readable)
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,

    /// Additional context (for debugging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<HashMap<String, serde_json::Value>>,

    /// Is this recoverable by resubmitting?
    pub recoverable: bool,
}

impl ContractError {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            recoverable: code.is_typically_recoverable(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let context = self.context.get_or_insert_with(HashMap::new);
        if let Ok(v) = serde_json::to_value(value) {
            context.insert(key.into(), v);
        }
        self
    }

    // ═══════════════════════════════════════════════════════════
    // Common error constructors
    // ═══════════════════════════════════════════════════════════

    /// Ledger call failed
    pub fn ledger(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::LedgerError, message)
    }

    /// Stored bytes do not decode into the schema
    pub fn malformed_record(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::MalformedRecord,
            format!("record at key {} is malformed: {}", key, reason),
        )
        .with_context("key", key)
    }

    /// Schema definition rejected
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSchema, message)
    }

    /// Seed fixture rejected
    pub fn invalid_fixture(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFixture, message)
    }

    /// Configuration rejected
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, message)
    }
}

/// Domain error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// get/put/range-scan failed
    LedgerError,

    /// Stored value is not a record of this schema
    MalformedRecord,

    /// Schema definition is invalid
    InvalidSchema,

    /// Seed fixture is invalid
    InvalidFixture,

    /// Contract configuration is invalid
    InvalidConfig,

    /// JSON encode/decode failed outside of record decoding
    Serialization,
}

impl ErrorCode {
    /// Check if this error is typically recoverable
    pub fn is_typically_recoverable(&self) -> bool {
        match self {
            Self::LedgerError => true, // Can resubmit
            Self::MalformedRecord => false,
            Self::InvalidSchema | Self::InvalidFixture | Self::InvalidConfig => false,
            Self::Serialization => false,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LedgerError => "LEDGER_ERROR",
            Self::MalformedRecord => "MALFORMED_RECORD",
            Self::InvalidSchema => "INVALID_SCHEMA",
            Self::InvalidFixture => "INVALID_FIXTURE",
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::Serialization => "SERIALIZATION",
        };
        write!(f, "{}", s)
    }
}

impl From<LedgerError> for ContractError {
    fn from(e: LedgerError) -> Self {
        ContractError::ledger(e.to_string())
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(e: serde_json::Error) -> Self {
        ContractError::new(ErrorCode::Serialization, format!("JSON error: {}", e))
    }
}

impl From<std::io::Error> for ContractError {
    fn from(e: std::io::Error) -> Self {
        ContractError::new(ErrorCode::InvalidConfig, format!("I/O error: {}", e))
            .with_context("io_error_kind", format!("{:?}", e.kind()))
    }
}

// ═══════════════════════════════════════════════════════════════════
// Invocation boundary
// ═══════════════════════════════════════════════════════════════════

/// Any error an invocation can end with.
#[derive(Debug, Clone, Error)]
pub enum InvokeError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl InvokeError {
    /// Stable machine-readable code for events and logs
    pub fn code(&self) -> String {
        match self {
            Self::Protocol(e) => e.code.to_string(),
            Self::Contract(e) => e.code.to_string(),
        }
    }

    /// The failure message surfaced to the caller
    pub fn message(&self) -> &str {
        match self {
            Self::Protocol(e) => &e.message,
            Self::Contract(e) => &e.message,
        }
    }
}

impl From<LedgerError> for InvokeError {
    fn from(e: LedgerError) -> Self {
        InvokeError::Contract(e.into())
    }
}

/// Result type alias for domain operations
pub type ContractResult<T> = Result<T, ContractError>;

/// Result type alias for invocations
pub type InvokeResult<T> = Result<T, InvokeError>;
