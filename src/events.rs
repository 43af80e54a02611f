//! Contract events for observability.
//!
//! The contract publishes an event for every ledger write and every failed
//! invocation. Events never influence control flow; a contract with no
//! subscribers behaves identically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::broadcast;

use crate::config::MAX_EVENT_CAPACITY;
use crate::invocation::Operation;
use crate::types::UniqueId;

/// Unique event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub UniqueId);

impl EventId {
    pub fn new() -> Self {
        Self(UniqueId::new())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evt_{}", self.0)
    }
}

/// Event kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventType {
    /// Contract instantiated on the platform.
    Instantiated,

    /// Seed records written by `initLedger`.
    LedgerSeeded { records: usize },

    /// A record was written by `create` or `update`.
    RecordWritten { key: String, operation: Operation },

    /// An invocation ended in failure.
    OperationFailed {
        function: String,
        error_code: String,
        message: String,
    },
}

impl EventType {
    /// Snake-case kind name, as serialized
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Instantiated => "instantiated",
            Self::LedgerSeeded { .. } => "ledger_seeded",
            Self::RecordWritten { .. } => "record_written",
            Self::OperationFailed { .. } => "operation_failed",
        }
    }
}

/// Event emitted by a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractEvent {
    /// Unique event ID.
    pub id: EventId,

    /// Namespace of the emitting contract.
    pub namespace: String,

    /// Event type and data.
    #[serde(flatten)]
    pub event_type: EventType,

    /// Timestamp.
    pub timestamp: DateTime<Utc>,
}

impl ContractEvent {
    /// Create a new event.
    pub fn new(namespace: impl Into<String>, event_type: EventType) -> Self {
        Self {
            id: EventId::new(),
            namespace: namespace.into(),
            event_type,
            timestamp: Utc::now(),
        }
    }

    pub fn instantiated(namespace: impl Into<String>) -> Self {
        Self::new(namespace, EventType::Instantiated)
    }

    pub fn ledger_seeded(namespace: impl Into<String>, records: usize) -> Self {
        Self::new(namespace, EventType::LedgerSeeded { records })
    }

    pub fn record_written(
        namespace: impl Into<String>,
        key: impl Into<String>,
        operation: Operation,
    ) -> Self {
        Self::new(
            namespace,
            EventType::RecordWritten {
                key: key.into(),
                operation,
            },
        )
    }

    pub fn operation_failed(
        namespace: impl Into<String>,
        function: impl Into<String>,
        error_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            namespace,
            EventType::OperationFailed {
                function: function.into(),
                error_code: error_code.into(),
                message: message.into(),
            },
        )
    }
}

/// Filter for selecting events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Filter by namespace.
    pub namespace: Option<String>,

    /// Filter by event kind names (`record_written`, ...).
    pub kinds: Option<Vec<String>>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kinds.get_or_insert_with(Vec::new).push(kind.into());
        self
    }

    /// Check if an event matches this filter.
    pub fn matches(&self, event: &ContractEvent) -> bool {
        if let Some(ns) = &self.namespace {
            if event.namespace != *ns {
                return false;
            }
        }

        if let Some(kinds) = &self.kinds {
            if !kinds.iter().any(|k| k == event.event_type.kind()) {
                return false;
            }
        }

        true
    }
}

/// Event receiver (broadcast channel).
pub type EventReceiver = broadcast::Receiver<ContractEvent>;

/// Event sender (broadcast channel).
pub type EventSender = broadcast::Sender<ContractEvent>;

/// Event emitter trait for observability.
pub trait EventEmitter {
    /// Subscribe to all future events.
    fn subscribe(&self) -> EventReceiver;

    /// Recent events matching `filter`, newest first.
    fn recent_events(&self, filter: &EventFilter, limit: usize) -> Vec<ContractEvent>;

    /// Emit an event.
    fn emit(&self, event: ContractEvent);
}

/// Buffers recent events and fans them out to subscribers.
#[derive(Debug)]
pub struct EventManager {
    sender: EventSender,
    recent: Mutex<VecDeque<ContractEvent>>,
    max_recent: usize,
}

impl EventManager {
    /// Create a new event manager. `capacity` is clamped to
    /// `1..=MAX_EVENT_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_EVENT_CAPACITY);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            recent: Mutex::new(VecDeque::new()),
            max_recent: capacity,
        }
    }

    /// Emit an event.
    pub fn emit(&self, event: ContractEvent) {
        {
            // A poisoned buffer only loses history
            let mut recent = match self.recent.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if recent.len() == self.max_recent {
                recent.pop_front();
            }
            recent.push_back(event.clone());
        }

        // Broadcast (ignore errors if no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Recent events matching `filter`, newest first.
    pub fn recent(&self, filter: &EventFilter, limit: usize) -> Vec<ContractEvent> {
        let recent = match self.recent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        recent
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .take(limit)
            .cloned()
            .collect()
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new(256)
    }
}
