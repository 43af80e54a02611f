//! Core Chaincode trait: the lifecycle every contract exposes to the
//! ledger platform.

use serde::{Deserialize, Serialize};

use crate::invocation::{InvokeRequest, Response};
use crate::ledger::Ledger;
use crate::types::{OperationInfo, Version};

/// A contract the ledger platform can instantiate and invoke.
///
/// The platform calls `init` once when the contract is instantiated and
/// `invoke` for every transaction proposal. The ledger handed in is the
/// transaction's view of world state; implementations keep no record state
/// of their own between calls.
pub trait Chaincode: Send + Sync {
    /// Instantiate the contract
    fn init(&self, ledger: &mut dyn Ledger) -> Response;

    /// Run one transaction request
    fn invoke(&self, ledger: &mut dyn Ledger, request: &InvokeRequest) -> Response;

    /// Contract name
    fn name(&self) -> String;

    /// Contract version
    fn version(&self) -> Version;

    /// Operations this contract accepts
    fn operations(&self) -> Vec<OperationInfo>;

    // ═══════════════════════════════════════════════════════
    // DEFAULT IMPLEMENTATIONS
    // ═══════════════════════════════════════════════════════

    /// Check if `function` names an accepted operation
    fn supports(&self, function: &str) -> bool {
        self.operations()
            .iter()
            .any(|op| op.name == function || op.alias.as_deref() == Some(function))
    }

    /// Invoke from a flat argument list whose first element is the function
    fn invoke_args(&self, ledger: &mut dyn Ledger, args: Vec<String>) -> Response {
        match InvokeRequest::from_args(args) {
            Ok(request) => self.invoke(ledger, &request),
            Err(e) => e.into(),
        }
    }
}

/// Information about a contract (for discovery)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaincodeInfo {
    pub name: String,
    pub version: Version,
    pub operations: Vec<OperationInfo>,
}

impl ChaincodeInfo {
    /// Create from a contract instance
    pub fn from_chaincode<C: Chaincode + ?Sized>(chaincode: &C) -> Self {
        Self {
            name: chaincode.name(),
            version: chaincode.version(),
            operations: chaincode.operations(),
        }
    }
}
