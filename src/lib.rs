//! # Ledger Record Contract
//!
//! A schema-parameterized record contract over an ordered key-value ledger.
//!
//! One contract instance owns one namespace (`EMR`, `HOSO`, ...) and one
//! fixed, ordered schema of string fields. It exposes five operations:
//!
//! - **query**: raw stored bytes for a key, or a not-found marker
//! - **initLedger**: write the seed records to `<NS>0`, `<NS>1`, ...
//! - **create**: write a record built positionally from field values
//! - **queryAll**: every record in `[<NS>0, <NS>999)` as a JSON array
//! - **update**: replace the display-name field of one record
//!
//! The ledger is injected per call through the [`Ledger`](ledger::Ledger)
//! trait, so the contract itself holds no record state. Range scans are
//! wrapped in a [`ScanGuard`](ledger::ScanGuard) that closes the underlying
//! iterator exactly once on every path.
//!
//! Errors follow a two-layer model: [`ProtocolError`](errors::ProtocolError)
//! for bad requests (unknown function, wrong argument count) and
//! [`ContractError`](errors::ContractError) for failures while executing
//! (ledger errors, malformed stored records). Both end up as a
//! [`Response::Failure`](invocation::Response) at the invocation boundary.
//!
//! ## Usage
//!
//! ```rust
//! use ledger_record_contract::prelude::*;
//!
//! let contract = RecordContract::exam_records().unwrap();
//! let mut ledger = MemoryLedger::new();
//!
//! let create = InvokeRequest::new("create")
//!     .args(["EMR5", "P001", "Alice", "1990-01-01", "F", "", "123 Main"]);
//! assert!(contract.invoke(&mut ledger, &create).is_success());
//!
//! let update = InvokeRequest::new("changeEMR").args(["EMR5", "Alicia"]);
//! assert!(contract.invoke(&mut ledger, &update).is_success());
//!
//! let read = contract.invoke(&mut ledger, &InvokeRequest::new("query").arg("EMR5"));
//! let record: serde_json::Value = serde_json::from_slice(read.bytes().unwrap()).unwrap();
//! assert_eq!(record["hoten"], "Alicia");
//! assert_eq!(record["mabn"], "P001");
//! ```

pub mod chaincode;
pub mod config;
pub mod contract;
pub mod errors;
pub mod events;
pub mod fixture;
pub mod invocation;
pub mod ledger;
pub mod memory;
pub mod query;
pub mod schema;
pub mod types;

// Re-export everything in prelude for convenience
pub mod prelude {
    pub use crate::chaincode::*;
    pub use crate::config::*;
    pub use crate::contract::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::fixture::*;
    pub use crate::invocation::*;
    pub use crate::ledger::*;
    pub use crate::memory::*;
    pub use crate::query::*;
    pub use crate::schema::*;
    pub use crate::types::*;
}
