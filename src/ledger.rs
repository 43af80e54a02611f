//! The ledger collaborator.
//!
//! The contract never owns record state. Every invocation receives a
//! `Ledger` (an ordered, string-keyed byte store) and talks to it through
//! three calls: point read, point write, and a half-open range scan.
//! Consensus, endorsement and persistence all live behind this trait.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error reported by a ledger implementation.
///
/// The message is propagated verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LedgerError {
    pub message: String,
}

impl LedgerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for ledger calls
pub type LedgerResult<T> = Result<T, LedgerError>;

/// One `(key, value)` pair yielded by a range scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: String,
    pub value: Vec<u8>,
}

impl LedgerEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A closable cursor over a key range.
///
/// Items arrive in ascending key order. Any item may be an error, which
/// ends the scan for the caller.
pub trait StateIterator: Iterator<Item = LedgerResult<LedgerEntry>> {
    /// Release the underlying scan resource.
    ///
    /// Called exactly once by [`ScanGuard`]; implementations need not be
    /// idempotent.
    fn close(&mut self) -> LedgerResult<()>;
}

/// Ordered key-value store the contract executes against.
pub trait Ledger {
    /// Read the value stored at `key`. `Ok(None)` means the key is absent.
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Write `value` at `key`, replacing any previous value.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> LedgerResult<()>;

    /// Scan keys in `[start_key, end_key)` in lexicographic order.
    fn state_by_range<'a>(
        &'a self,
        start_key: &str,
        end_key: &str,
    ) -> LedgerResult<Box<dyn StateIterator + 'a>>;

    /// Check if a key holds a value
    fn has_state(&self, key: &str) -> LedgerResult<bool> {
        Ok(self.get_state(key)?.is_some())
    }
}

/// Owns an open scan and guarantees it is closed exactly once.
///
/// Call [`ScanGuard::close`] on the success path to observe close errors;
/// every other exit path (early return, `?`, panic unwinding) closes the
/// scan on drop.
pub struct ScanGuard<'a> {
    inner: Box<dyn StateIterator + 'a>,
    closed: bool,
}

impl<'a> ScanGuard<'a> {
    pub fn new(inner: Box<dyn StateIterator + 'a>) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Close the scan and report the result.
    pub fn close(mut self) -> LedgerResult<()> {
        self.closed = true;
        self.inner.close()
    }
}

impl Iterator for ScanGuard<'_> {
    type Item = LedgerResult<LedgerEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        self.inner.next()
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.inner.close() {
            tracing::warn!(error = %e, "failed to close range scan");
        }
    }
}
