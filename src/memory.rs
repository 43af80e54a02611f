//! In-memory reference ledger.
//!
//! `MemoryLedger` keeps state in a `BTreeMap`, which gives the ordered,
//! half-open range scans the contract relies on. It also counts scans so
//! tests can check that every scan the contract opens gets closed.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::ledger::{Ledger, LedgerEntry, LedgerError, LedgerResult, StateIterator};

/// Ordered in-memory ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: BTreeMap<String, Vec<u8>>,
    open_scans: Arc<AtomicUsize>,
    scans_opened: AtomicUsize,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-populated with raw entries
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let mut ledger = Self::new();
        for (k, v) in entries {
            ledger.state.insert(k.into(), v.into());
        }
        ledger
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Check if the ledger holds no keys
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// All stored keys in order
    pub fn keys(&self) -> Vec<String> {
        self.state.keys().cloned().collect()
    }

    /// Scans opened but not yet closed
    pub fn open_scans(&self) -> usize {
        self.open_scans.load(Ordering::SeqCst)
    }

    /// Total scans ever opened
    pub fn scans_opened(&self) -> usize {
        self.scans_opened.load(Ordering::SeqCst)
    }
}

impl Clone for MemoryLedger {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            open_scans: Arc::new(AtomicUsize::new(0)),
            scans_opened: AtomicUsize::new(0),
        }
    }
}

impl PartialEq for MemoryLedger {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl Ledger for MemoryLedger {
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        if key.is_empty() {
            return Err(LedgerError::new("key must not be an empty string"));
        }
        self.state.insert(key.to_string(), value);
        Ok(())
    }

    fn state_by_range<'a>(
        &'a self,
        start_key: &str,
        end_key: &str,
    ) -> LedgerResult<Box<dyn StateIterator + 'a>> {
        // BTreeMap::range panics on an inverted range
        let entries: Vec<LedgerEntry> = if start_key < end_key {
            self.state
                .range::<str, _>((Bound::Included(start_key), Bound::Excluded(end_key)))
                .map(|(k, v)| LedgerEntry::new(k.clone(), v.clone()))
                .collect()
        } else {
            Vec::new()
        };

        self.open_scans.fetch_add(1, Ordering::SeqCst);
        self.scans_opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryScan {
            entries: entries.into_iter(),
            open_scans: self.open_scans.clone(),
        }))
    }
}

struct MemoryScan {
    entries: std::vec::IntoIter<LedgerEntry>,
    open_scans: Arc<AtomicUsize>,
}

impl Iterator for MemoryScan {
    type Item = LedgerResult<LedgerEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Ok)
    }
}

impl StateIterator for MemoryScan {
    fn close(&mut self) -> LedgerResult<()> {
        self.open_scans.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ScanGuard;

    fn keys_in(ledger: &MemoryLedger, start: &str, end: &str) -> Vec<String> {
        let scan = ScanGuard::new(ledger.state_by_range(start, end).unwrap());
        scan.map(|e| e.unwrap().key).collect()
    }

    #[test]
    fn test_get_put() {
        let mut ledger = MemoryLedger::new();
        assert_eq!(ledger.get_state("EMR0").unwrap(), None);

        ledger.put_state("EMR0", b"{}".to_vec()).unwrap();
        assert_eq!(ledger.get_state("EMR0").unwrap(), Some(b"{}".to_vec()));
        assert!(ledger.has_state("EMR0").unwrap());
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut ledger = MemoryLedger::new();
        assert!(ledger.put_state("", b"{}".to_vec()).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_range_is_half_open_and_lexicographic() {
        let ledger = MemoryLedger::with_entries([
            ("EMR0", "a"),
            ("EMR10", "b"),
            ("EMR5", "c"),
            ("EMR999", "d"),
            ("EMRA", "e"),
            ("HOSO0", "f"),
        ]);

        assert_eq!(
            keys_in(&ledger, "EMR0", "EMR999"),
            vec!["EMR0", "EMR10", "EMR5"]
        );
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let ledger = MemoryLedger::with_entries([("b", "1")]);
        assert!(keys_in(&ledger, "z", "a").is_empty());
    }

    #[test]
    fn test_scan_accounting() {
        let ledger = MemoryLedger::with_entries([("k1", "1"), ("k2", "2")]);
        {
            let scan = ScanGuard::new(ledger.state_by_range("k", "l").unwrap());
            assert_eq!(ledger.open_scans(), 1);
            scan.close().unwrap();
        }
        assert_eq!(ledger.open_scans(), 0);
        assert_eq!(ledger.scans_opened(), 1);
    }
}
