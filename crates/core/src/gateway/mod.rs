//! Record gateway - the client interface to the remote record store
//!
//! The store is a generic collection/record service: every record is a flat
//! map of string-keyed fields with a numeric `Id`. The façades only ever talk
//! to it through [`RecordGateway`], which is injected at construction so a
//! test double (or a future network client) can stand in.

mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::RecordId;

pub use memory::InMemoryGateway;

/// A raw record as the store returns it
pub type RawRecord = serde_json::Map<String, Value>;

/// Name of the identifier field on every record
pub const ID_FIELD: &str = "Id";

/// Named collections used by the front desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Collection {
    #[serde(rename = "room_c")]
    Rooms,
    #[serde(rename = "housekeeping_task_c")]
    HousekeepingTasks,
    #[serde(rename = "staff_c")]
    Staff,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Rooms => "room_c",
            Collection::HousekeepingTasks => "housekeeping_task_c",
            Collection::Staff => "staff_c",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Field selection entry: `{"field": {"Name": "..."}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub field: FieldName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

impl FieldSelector {
    pub fn new(name: &str) -> Self {
        Self {
            field: FieldName {
                name: name.to_string(),
            },
        }
    }

    pub fn list(names: &[&str]) -> Vec<Self> {
        names.iter().map(|name| Self::new(name)).collect()
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    EqualTo,
}

/// A `where` clause entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "FieldName")]
    pub field: String,
    #[serde(rename = "Operator")]
    pub operator: FilterOperator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field: String,
    #[serde(rename = "sorttype")]
    pub direction: SortDirection,
}

/// Parameters of a collection fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchQuery {
    pub fields: Vec<FieldSelector>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
}

impl FetchQuery {
    pub fn select(fields: &[&str]) -> Self {
        Self {
            fields: FieldSelector::list(fields),
            ..Default::default()
        }
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            operator: FilterOperator::EqualTo,
            values: vec![value.into()],
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }
}

/// Response of `fetch_records`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RawRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `get_record_by_id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<RawRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Per-record outcome inside a create/update batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default)]
    pub data: Option<RawRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordResult {
    pub fn ok(data: RawRecord) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Response of `create_records` and `update_records`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<RecordResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `delete_records`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Client interface to the remote record store
///
/// `Err` means the exchange itself failed (transport). A completed exchange
/// the store refused comes back as `Ok` with `success == false`.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Fetch all records of a collection matching the query
    async fn fetch_records(&self, collection: Collection, query: &FetchQuery)
        -> Result<FetchResponse>;

    /// Fetch one record by identifier
    async fn get_record_by_id(
        &self,
        collection: Collection,
        id: RecordId,
        fields: &[FieldSelector],
    ) -> Result<RecordResponse>;

    /// Create records; the store assigns identifiers
    async fn create_records(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<BatchResponse>;

    /// Partially update records; each must carry its `Id`
    async fn update_records(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<BatchResponse>;

    /// Delete records by identifier
    async fn delete_records(&self, collection: Collection, ids: &[RecordId])
        -> Result<DeleteResponse>;
}

/// Turn a `success == false` response into an error carrying its message
pub fn ensure_success(success: bool, message: Option<&str>) -> Result<()> {
    if success {
        Ok(())
    } else {
        Err(Error::Gateway(
            message
                .filter(|m| !m.is_empty())
                .unwrap_or("Request failed")
                .to_string(),
        ))
    }
}

/// Read the `Id` of a raw record; accepts numbers and numeric strings
pub fn record_id(raw: &RawRecord) -> Option<RecordId> {
    match raw.get(ID_FIELD)? {
        Value::Number(n) => n.as_i64().map(RecordId),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Serializable dump of a store, keyed by collection
pub type StoreSnapshot = BTreeMap<Collection, Vec<RawRecord>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_wire_shape() {
        let query = FetchQuery::select(&["Name", "status_c"])
            .where_eq("status_c", "pending")
            .order_by("created_at_c", SortDirection::Descending);

        let wire = serde_json::to_value(&query).unwrap();
        assert_eq!(
            wire,
            json!({
                "fields": [{"field": {"Name": "Name"}}, {"field": {"Name": "status_c"}}],
                "where": [{"FieldName": "status_c", "Operator": "EqualTo", "Values": ["pending"]}],
                "orderBy": [{"fieldName": "created_at_c", "sorttype": "DESC"}]
            })
        );
    }

    #[test]
    fn test_record_id_accepts_numeric_string() {
        let raw = json!({"Id": "12"}).as_object().cloned().unwrap();
        assert_eq!(record_id(&raw), Some(RecordId(12)));

        let raw = json!({"Id": 7}).as_object().cloned().unwrap();
        assert_eq!(record_id(&raw), Some(RecordId(7)));

        let raw = json!({"Name": "x"}).as_object().cloned().unwrap();
        assert_eq!(record_id(&raw), None);
    }

    #[test]
    fn test_ensure_success_uses_message() {
        assert!(ensure_success(true, None).is_ok());
        let err = ensure_success(false, Some("quota exceeded")).unwrap_err();
        assert_eq!(err.to_string(), "Gateway error: quota exceeded");
        let err = ensure_success(false, None).unwrap_err();
        assert_eq!(err.to_string(), "Gateway error: Request failed");
    }

    #[test]
    fn test_response_defaults_when_fields_missing() {
        let resp: BatchResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.results.is_empty());
        assert!(resp.message.is_none());
    }
}
