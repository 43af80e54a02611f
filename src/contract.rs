//! The schema-parameterized record contract.
//!
//! One `RecordContract` serves one namespace and one schema. It routes each
//! request through a dispatch table built at construction, validates the
//! argument count, and then reads or writes whole records on the ledger.

use std::collections::HashMap;
use std::sync::Arc;

use crate::chaincode::Chaincode;
use crate::config::ContractConfig;
use crate::errors::{ContractError, ContractResult, InvokeResult, ProtocolError};
use crate::events::{ContractEvent, EventEmitter, EventFilter, EventManager, EventReceiver};
use crate::invocation::{InvokeRequest, Operation, Payload, Response};
use crate::ledger::Ledger;
use crate::query::{self, KeyRange, RangeEntry};
use crate::schema::{Record, Schema};
use crate::types::{Namespace, OperationInfo, Version};

/// Record contract bound to one namespace and schema.
#[derive(Debug)]
pub struct RecordContract {
    namespace: Namespace,
    schema: Arc<Schema>,
    range: KeyRange,
    seed: Vec<Record>,
    dispatch: HashMap<String, Operation>,
    legacy_names: bool,
    events: EventManager,
}

impl RecordContract {
    /// Build a contract from configuration.
    ///
    /// Resolves schema and seed, validates the seed against the schema and
    /// builds the dispatch table. Fails if two operations would share a name.
    pub fn new(config: ContractConfig) -> ContractResult<Self> {
        config.validate()?;

        let namespace = Namespace::new(config.namespace.clone())?;
        let schema = Arc::new(config.resolve_schema()?);
        let seed = config.resolve_seed(&schema)?.into_records(&schema)?;
        let range = KeyRange::for_namespace(&namespace, &config.range_start, &config.range_end);
        let dispatch = build_dispatch(&namespace, config.legacy_operation_names)?;

        Ok(Self {
            namespace,
            schema,
            range,
            seed,
            dispatch,
            legacy_names: config.legacy_operation_names,
            events: EventManager::new(config.event_capacity),
        })
    }

    /// The shipped exam-record contract (`EMR`)
    pub fn exam_records() -> ContractResult<Self> {
        Self::new(ContractConfig::exam_records())
    }

    /// The shipped case-file contract (`HOSO`)
    pub fn case_files() -> ContractResult<Self> {
        Self::new(ContractConfig::case_files())
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The key window `queryAll` scans
    pub fn range(&self) -> &KeyRange {
        &self.range
    }

    /// Records `initLedger` writes, in order
    pub fn seed_records(&self) -> &[Record] {
        &self.seed
    }

    /// Look up the operation registered under `function`.
    pub fn resolve(&self, function: &str) -> InvokeResult<Operation> {
        self.dispatch
            .get(function)
            .copied()
            .ok_or_else(|| ProtocolError::unknown_function(function).into())
    }

    /// Number of arguments `op` requires.
    pub fn expected_args(&self, op: Operation) -> usize {
        match op {
            Operation::Query => 1,
            Operation::InitLedger | Operation::QueryAll => 0,
            Operation::Create => 1 + self.schema.field_count(),
            Operation::Update => 2,
        }
    }

    // ═══════════════════════════════════════════════════════
    // OPERATIONS
    // ═══════════════════════════════════════════════════════

    /// Raw stored bytes at `key`, `None` if the key holds nothing.
    pub fn query(&self, ledger: &dyn Ledger, key: &str) -> ContractResult<Option<Vec<u8>>> {
        Ok(ledger.get_state(key)?)
    }

    /// Write a record built positionally from `values`, replacing any
    /// record already at `key`.
    pub fn create(
        &self,
        ledger: &mut dyn Ledger,
        key: &str,
        values: Vec<String>,
    ) -> ContractResult<Record> {
        let record = Record::from_values(self.schema.clone(), values)?;
        ledger.put_state(key, record.encode()?)?;

        self.events.emit(ContractEvent::record_written(
            self.namespace.as_str(),
            key,
            Operation::Create,
        ));
        Ok(record)
    }

    /// Replace the display-name field of the record at `key`.
    ///
    /// An absent key is treated as an all-empty record, so the write still
    /// happens. Malformed stored bytes fail without writing.
    pub fn update(
        &self,
        ledger: &mut dyn Ledger,
        key: &str,
        new_name: &str,
    ) -> ContractResult<Record> {
        let current = match ledger.get_state(key)? {
            Some(bytes) => Record::decode(self.schema.clone(), key, &bytes)?,
            None => Record::empty(self.schema.clone()),
        };

        let updated = current.with_display_name(new_name);
        ledger.put_state(key, updated.encode()?)?;

        self.events.emit(ContractEvent::record_written(
            self.namespace.as_str(),
            key,
            Operation::Update,
        ));
        Ok(updated)
    }

    /// Every record in the namespace window, in ledger order.
    pub fn query_all(&self, ledger: &dyn Ledger) -> ContractResult<Vec<RangeEntry>> {
        query::collect_range(ledger, &self.range, &self.schema)
    }

    /// Write the seed records to `<namespace>0..`. Returns how many.
    pub fn init_ledger(&self, ledger: &mut dyn Ledger) -> ContractResult<usize> {
        for (i, record) in self.seed.iter().enumerate() {
            let key = self.namespace.seed_key(i);
            ledger.put_state(&key, record.encode()?)?;
            tracing::info!(
                namespace = %self.namespace,
                key = %key,
                name = record.display_name(),
                "seeded record"
            );
        }

        tracing::info!(
            namespace = %self.namespace,
            records = self.seed.len(),
            "ledger seeded"
        );
        self.events.emit(ContractEvent::ledger_seeded(
            self.namespace.as_str(),
            self.seed.len(),
        ));
        Ok(self.seed.len())
    }

    // ═══════════════════════════════════════════════════════
    // DISPATCH
    // ═══════════════════════════════════════════════════════

    fn execute(
        &self,
        ledger: &mut dyn Ledger,
        op: Operation,
        args: &[String],
    ) -> InvokeResult<Payload> {
        let expected = self.expected_args(op);
        if args.len() != expected {
            return Err(ProtocolError::invalid_arity(expected, args.len()).into());
        }

        match op {
            Operation::Query => Ok(match self.query(ledger, &args[0])? {
                Some(bytes) => Payload::Bytes(bytes),
                None => Payload::NotFound,
            }),
            Operation::InitLedger => {
                self.init_ledger(ledger)?;
                Ok(Payload::Empty)
            }
            Operation::Create => {
                self.create(ledger, &args[0], args[1..].to_vec())?;
                Ok(Payload::Empty)
            }
            Operation::QueryAll => {
                let entries = self.query_all(ledger)?;
                let json = query::to_json_array(&entries)?;
                tracing::debug!(
                    namespace = %self.namespace,
                    records = entries.len(),
                    "aggregated range"
                );
                Ok(Payload::Bytes(json))
            }
            Operation::Update => {
                self.update(ledger, &args[0], &args[1])?;
                Ok(Payload::Empty)
            }
        }
    }
}

fn build_dispatch(
    namespace: &Namespace,
    legacy_names: bool,
) -> ContractResult<HashMap<String, Operation>> {
    let mut dispatch = HashMap::new();

    let mut register = |name: String, op: Operation| -> ContractResult<()> {
        if let Some(existing) = dispatch.insert(name.clone(), op) {
            return Err(ContractError::invalid_config(format!(
                "operation name {} maps to both {} and {}",
                name, existing, op
            )));
        }
        Ok(())
    };

    for op in Operation::ALL {
        register(op.name().to_string(), op)?;
    }
    if legacy_names {
        for op in Operation::ALL {
            if let Some(name) = op.qualified_name(namespace.as_str()) {
                register(name, op)?;
            }
        }
    }

    Ok(dispatch)
}

impl Chaincode for RecordContract {
    fn init(&self, _ledger: &mut dyn Ledger) -> Response {
        self.events
            .emit(ContractEvent::instantiated(self.namespace.as_str()));
        Response::success(Payload::Empty)
    }

    fn invoke(&self, ledger: &mut dyn Ledger, request: &InvokeRequest) -> Response {
        tracing::debug!(
            namespace = %self.namespace,
            function = %request.function,
            args = request.args.len(),
            "invoke"
        );

        let result = self
            .resolve(&request.function)
            .and_then(|op| self.execute(ledger, op, &request.args));

        if let Err(e) = &result {
            tracing::warn!(
                namespace = %self.namespace,
                function = %request.function,
                code = %e.code(),
                error = %e,
                "invocation failed"
            );
            self.events.emit(ContractEvent::operation_failed(
                self.namespace.as_str(),
                request.function.as_str(),
                e.code(),
                e.message(),
            ));
        }

        result.into()
    }

    fn name(&self) -> String {
        self.schema.name().to_string()
    }

    fn version(&self) -> Version {
        Version::new(0, 1, 0)
    }

    fn operations(&self) -> Vec<OperationInfo> {
        let key_arg = || "key".to_string();
        Operation::ALL
            .iter()
            .map(|&op| {
                let (description, args) = match op {
                    Operation::Query => ("Read the raw record stored at a key", vec![key_arg()]),
                    Operation::InitLedger => ("Write the seed records", vec![]),
                    Operation::Create => (
                        "Write a record from one value per schema field",
                        std::iter::once(key_arg())
                            .chain(self.schema.fields().iter().cloned())
                            .collect(),
                    ),
                    Operation::QueryAll => ("List every record in the namespace range", vec![]),
                    Operation::Update => (
                        "Replace the display-name field of a record",
                        vec![key_arg(), self.schema.display_field().to_string()],
                    ),
                };
                let info = OperationInfo::new(op.name(), description).args(args);
                match op.qualified_name(self.namespace.as_str()) {
                    Some(alias) if self.legacy_names => info.alias(alias),
                    _ => info,
                }
            })
            .collect()
    }
}

impl EventEmitter for RecordContract {
    fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    fn recent_events(&self, filter: &EventFilter, limit: usize) -> Vec<ContractEvent> {
        self.events.recent(filter, limit)
    }

    fn emit(&self, event: ContractEvent) {
        self.events.emit(event);
    }
}
