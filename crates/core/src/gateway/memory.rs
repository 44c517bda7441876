//! In-memory record store
//!
//! Behaves like the remote store closely enough for the façades: partial
//! updates merge fields, `null` clears a field, omitted fields are untouched,
//! and results come back in request order. Faults can be injected per call or
//! per record so failure handling can be exercised.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    record_id, BatchResponse, Collection, DeleteResponse, FetchQuery, FetchResponse,
    FieldSelector, FilterOperator, RawRecord, RecordGateway, RecordResponse, RecordResult,
    SortDirection, StoreSnapshot, ID_FIELD,
};
use crate::error::{Error, Result};
use crate::models::RecordId;

#[derive(Default)]
struct StoreState {
    tables: HashMap<Collection, BTreeMap<RecordId, RawRecord>>,
    /// Highest identifier issued per collection
    next_id: HashMap<Collection, i64>,
    offline: bool,
    refuse_calls: Option<String>,
    rejected: HashMap<(Collection, RecordId), String>,
    write_calls: usize,
}

impl StoreState {
    fn table(&mut self, collection: Collection) -> &mut BTreeMap<RecordId, RawRecord> {
        self.tables.entry(collection).or_default()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.offline {
            return Err(Error::Gateway("Network unreachable".to_string()));
        }
        Ok(())
    }

    fn allocate_id(&mut self, collection: Collection) -> RecordId {
        let next = self.next_id.entry(collection).or_default();
        *next += 1;
        RecordId(*next)
    }

    fn insert(&mut self, collection: Collection, mut raw: RawRecord) -> RecordId {
        let id = match record_id(&raw) {
            Some(id) => {
                let next = self.next_id.entry(collection).or_default();
                *next = (*next).max(id.0);
                id
            }
            None => self.allocate_id(collection),
        };
        raw.insert(ID_FIELD.to_string(), Value::from(id.0));
        self.table(collection).insert(id, raw);
        id
    }
}

/// Record store held in process memory
#[derive(Default)]
pub struct InMemoryGateway {
    state: RwLock<StoreState>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot; records without an `Id` get one assigned
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut state = StoreState::default();
        for (collection, records) in snapshot {
            state.table(collection);
            for raw in records {
                state.insert(collection, raw);
            }
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// Dump every collection, records ordered by identifier
    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        state
            .tables
            .iter()
            .map(|(collection, table)| (*collection, table.values().cloned().collect()))
            .collect()
    }

    /// Insert a record directly, bypassing fault injection
    pub async fn insert(&self, collection: Collection, raw: RawRecord) -> RecordId {
        self.state.write().await.insert(collection, raw)
    }

    /// Read a record directly, bypassing fault injection
    pub async fn record(&self, collection: Collection, id: RecordId) -> Option<RawRecord> {
        let state = self.state.read().await;
        state.tables.get(&collection)?.get(&id).cloned()
    }

    /// Make every call fail at the transport level
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    /// Make every call complete with `success == false` and this message
    pub async fn refuse_calls(&self, message: Option<String>) {
        self.state.write().await.refuse_calls = message;
    }

    /// Make writes to one record fail inside an otherwise successful batch
    pub async fn reject_record(&self, collection: Collection, id: RecordId, message: &str) {
        self.state
            .write()
            .await
            .rejected
            .insert((collection, id), message.to_string());
    }

    /// Number of create/update/delete calls that reached the store
    pub async fn write_calls(&self) -> usize {
        self.state.read().await.write_calls
    }
}

fn project(raw: &RawRecord, fields: &[FieldSelector]) -> RawRecord {
    if fields.is_empty() {
        return raw.clone();
    }

    let wanted: HashSet<&str> = fields.iter().map(FieldSelector::name).collect();
    raw.iter()
        .filter(|(key, _)| key.as_str() == ID_FIELD || wanted.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn values_equal(stored: Option<&Value>, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Some(Value::String(a)), Value::String(b)) => a == b,
        (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Some(Value::Number(a)), Value::String(b)) | (Some(Value::String(b)), Value::Number(a)) => {
            b.trim().parse::<f64>().ok() == a.as_f64()
        }
        (Some(a), b) => a == b,
        (None, Value::Null) => true,
        (None, _) => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

#[async_trait]
impl RecordGateway for InMemoryGateway {
    async fn fetch_records(
        &self,
        collection: Collection,
        query: &FetchQuery,
    ) -> Result<FetchResponse> {
        let state = self.state.read().await;
        state.check_reachable()?;
        if let Some(message) = &state.refuse_calls {
            return Ok(FetchResponse {
                success: false,
                data: Vec::new(),
                message: Some(message.clone()),
            });
        }

        let mut rows: Vec<&RawRecord> = state
            .tables
            .get(&collection)
            .map(|table| table.values().collect())
            .unwrap_or_default();

        rows.retain(|raw| {
            query.filters.iter().all(|filter| match filter.operator {
                FilterOperator::EqualTo => filter
                    .values
                    .iter()
                    .any(|value| values_equal(raw.get(&filter.field), value)),
            })
        });

        // Stable sort, so apply keys from last to first
        for order in query.order_by.iter().rev() {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.field), b.get(&order.field));
                match order.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        let data: Vec<RawRecord> = rows
            .into_iter()
            .map(|raw| project(raw, &query.fields))
            .collect();
        debug!(collection = %collection, count = data.len(), "Fetched records");

        Ok(FetchResponse {
            success: true,
            data,
            message: None,
        })
    }

    async fn get_record_by_id(
        &self,
        collection: Collection,
        id: RecordId,
        fields: &[FieldSelector],
    ) -> Result<RecordResponse> {
        let state = self.state.read().await;
        state.check_reachable()?;
        if let Some(message) = &state.refuse_calls {
            return Ok(RecordResponse {
                success: false,
                data: None,
                message: Some(message.clone()),
            });
        }

        match state.tables.get(&collection).and_then(|table| table.get(&id)) {
            Some(raw) => Ok(RecordResponse {
                success: true,
                data: Some(project(raw, fields)),
                message: None,
            }),
            None => Ok(RecordResponse {
                success: false,
                data: None,
                message: Some(format!("Record {} not found in {}", id, collection)),
            }),
        }
    }

    async fn create_records(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<BatchResponse> {
        let mut state = self.state.write().await;
        state.check_reachable()?;
        state.write_calls += 1;
        if let Some(message) = state.refuse_calls.clone() {
            return Ok(BatchResponse {
                success: false,
                results: Vec::new(),
                message: Some(message),
            });
        }

        let results = records
            .into_iter()
            .map(|mut raw| {
                raw.remove(ID_FIELD);
                let id = state.insert(collection, raw);
                match state.tables.get(&collection).and_then(|table| table.get(&id)) {
                    Some(stored) => RecordResult::ok(stored.clone()),
                    None => RecordResult::failed("Record was not stored"),
                }
            })
            .collect();

        Ok(BatchResponse {
            success: true,
            results,
            message: None,
        })
    }

    async fn update_records(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<BatchResponse> {
        let mut state = self.state.write().await;
        state.check_reachable()?;
        state.write_calls += 1;
        if let Some(message) = state.refuse_calls.clone() {
            return Ok(BatchResponse {
                success: false,
                results: Vec::new(),
                message: Some(message),
            });
        }

        let mut results = Vec::with_capacity(records.len());
        for patch in records {
            let Some(id) = record_id(&patch) else {
                results.push(RecordResult::failed("Record is missing Id"));
                continue;
            };

            if let Some(message) = state.rejected.get(&(collection, id)) {
                results.push(RecordResult::failed(message.clone()));
                continue;
            }

            match state.table(collection).get_mut(&id) {
                Some(stored) => {
                    for (key, value) in patch {
                        if key != ID_FIELD {
                            stored.insert(key, value);
                        }
                    }
                    results.push(RecordResult::ok(stored.clone()));
                }
                None => results.push(RecordResult::failed(format!(
                    "Record {} not found in {}",
                    id, collection
                ))),
            }
        }

        debug!(collection = %collection, count = results.len(), "Updated records");

        Ok(BatchResponse {
            success: true,
            results,
            message: None,
        })
    }

    async fn delete_records(
        &self,
        collection: Collection,
        ids: &[RecordId],
    ) -> Result<DeleteResponse> {
        let mut state = self.state.write().await;
        state.check_reachable()?;
        state.write_calls += 1;
        if let Some(message) = state.refuse_calls.clone() {
            return Ok(DeleteResponse {
                success: false,
                message: Some(message),
            });
        }

        let table = state.table(collection);
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| table.remove(*id).is_none())
            .map(|id| id.to_string())
            .collect();

        if missing.is_empty() {
            Ok(DeleteResponse {
                success: true,
                message: None,
            })
        } else {
            Ok(DeleteResponse {
                success: false,
                message: Some(format!("Records not found: {}", missing.join(", "))),
            })
        }
    }
}
