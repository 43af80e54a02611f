//! Invocation surface: requests in, tagged responses out.
//!
//! A caller submits an operation name plus an ordered list of string
//! arguments. Every invocation ends in exactly one [`Response`]: success with
//! a [`Payload`], or failure with a message.

use serde::{Deserialize, Serialize};

use crate::errors::{InvokeError, InvokeResult, ProtocolError};

/// The five operations every record contract exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "initLedger")]
    InitLedger,
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "queryAll")]
    QueryAll,
    #[serde(rename = "update")]
    Update,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Query,
        Operation::InitLedger,
        Operation::Create,
        Operation::QueryAll,
        Operation::Update,
    ];

    /// Canonical invocation name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::InitLedger => "initLedger",
            Self::Create => "create",
            Self::QueryAll => "queryAll",
            Self::Update => "update",
        }
    }

    /// Namespace-qualified name (`queryEMR`, `changeHOSO`, ...).
    ///
    /// `initLedger` has no qualified form.
    pub fn qualified_name(&self, namespace: &str) -> Option<String> {
        match self {
            Self::Query => Some(format!("query{}", namespace)),
            Self::InitLedger => None,
            Self::Create => Some(format!("create{}", namespace)),
            Self::QueryAll => Some(format!("queryAll{}", namespace)),
            Self::Update => Some(format!("change{}", namespace)),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A transaction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Operation name
    pub function: String,

    /// Ordered string arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl InvokeRequest {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: vec![],
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Split a flat argument list whose first element is the function name.
    pub fn from_args<I, S>(args: I) -> InvokeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = args.into_iter().map(Into::into);
        let function = iter
            .next()
            .ok_or_else(|| ProtocolError::invalid_request("request has no function name"))?;
        Ok(Self {
            function,
            args: iter.collect(),
        })
    }
}

/// Success payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Nothing to return (writes)
    Empty,

    /// Returned bytes, verbatim
    Bytes(#[serde(with = "base64_serde")] Vec<u8>),

    /// The requested key holds no value
    NotFound,
}

impl Payload {
    /// Payload bytes; `Empty` and `NotFound` have none
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Success { payload: Payload },
    Failure { message: String },
}

impl Response {
    pub fn success(payload: Payload) -> Self {
        Self::Success { payload }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    /// Success payload bytes, if any
    pub fn bytes(&self) -> Option<&[u8]> {
        self.payload().and_then(Payload::as_bytes)
    }

    /// Failure message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failure { message } => Some(message),
            Self::Success { .. } => None,
        }
    }
}

impl From<InvokeResult<Payload>> for Response {
    fn from(result: InvokeResult<Payload>) -> Self {
        match result {
            Ok(payload) => Response::success(payload),
            Err(e) => Response::failure(e.message()),
        }
    }
}

impl From<InvokeError> for Response {
    fn from(e: InvokeError) -> Self {
        Response::failure(e.message())
    }
}

// Base64 serialization for payload bytes
mod base64_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
