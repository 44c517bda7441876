//! Raw record <-> domain object mapping
//!
//! The field-name constants below are used for both reading and writing, so a
//! rename only ever happens in one place.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::gateway::{record_id, Collection, RawRecord, ID_FIELD};
use crate::models::{
    HousekeepingTask, NewTask, Note, RecordId, Room, RoomStatus, Staff, StatusHistoryEntry,
    TaskPriority, TaskStatus, DEFAULT_ESTIMATED_MINUTES, DEFAULT_TASK_TYPE,
};

/// Display name field present on every collection
pub const NAME_FIELD: &str = "Name";

pub mod room_fields {
    pub const ROOM_NUMBER: &str = "room_number_c";
    pub const FLOOR: &str = "floor_c";
    pub const ROOM_TYPE: &str = "room_type_c";
    pub const STATUS: &str = "status_c";
    pub const NIGHTLY_RATE: &str = "nightly_rate_c";
    pub const GUEST_NAME: &str = "guest_name_c";
    pub const CHECKIN_TIME: &str = "checkin_time_c";
    pub const CHECKOUT_TIME: &str = "checkout_time_c";
    pub const BLOCKED: &str = "blocked_c";
    pub const BLOCK_REASON: &str = "block_reason_c";
    pub const LAST_UPDATED: &str = "last_updated_c";
    pub const NOTES: &str = "notes_c";
    pub const STATUS_HISTORY: &str = "status_history_c";

    pub const ALL: &[&str] = &[
        super::NAME_FIELD,
        ROOM_NUMBER,
        FLOOR,
        ROOM_TYPE,
        STATUS,
        NIGHTLY_RATE,
        GUEST_NAME,
        CHECKIN_TIME,
        CHECKOUT_TIME,
        BLOCKED,
        BLOCK_REASON,
        LAST_UPDATED,
        NOTES,
        STATUS_HISTORY,
    ];
}

pub mod task_fields {
    pub const ROOM_NUMBER: &str = "room_number_c";
    pub const STATUS: &str = "status_c";
    pub const ASSIGNED_STAFF: &str = "assigned_staff_c";
    pub const PRIORITY: &str = "priority_c";
    pub const ESTIMATED_TIME: &str = "estimated_time_c";
    pub const ACTUAL_TIME: &str = "actual_time_c";
    pub const START_TIME: &str = "start_time_c";
    pub const COMPLETED_TIME: &str = "completed_time_c";
    pub const TASK_TYPE: &str = "task_type_c";
    pub const SPECIAL_INSTRUCTIONS: &str = "special_instructions_c";
    pub const SUPPLIES: &str = "supplies_c";
    pub const CREATED_AT: &str = "created_at_c";
    pub const CREATED_BY: &str = "created_by_c";
    pub const ROOM_ID: &str = "room_id_c";
    pub const ASSIGNED_TO: &str = "assigned_to_c";

    pub const ALL: &[&str] = &[
        super::NAME_FIELD,
        ROOM_NUMBER,
        STATUS,
        ASSIGNED_STAFF,
        PRIORITY,
        ESTIMATED_TIME,
        ACTUAL_TIME,
        START_TIME,
        COMPLETED_TIME,
        TASK_TYPE,
        SPECIAL_INSTRUCTIONS,
        SUPPLIES,
        CREATED_AT,
        CREATED_BY,
        ROOM_ID,
        ASSIGNED_TO,
    ];
}

pub mod staff_fields {
    pub const NAME: &str = "name_c";
    pub const ROLE: &str = "role_c";
    pub const SHIFT: &str = "shift_c";
    pub const STATUS: &str = "status_c";
    pub const ACTIVE_ASSIGNMENTS: &str = "active_assignments_c";
    pub const COMPLETED_TODAY: &str = "completed_today_c";
    pub const RATING: &str = "rating_c";
    pub const SPECIALTIES: &str = "specialties_c";
    pub const DEPARTMENT: &str = "department_c";

    pub const ALL: &[&str] = &[
        super::NAME_FIELD,
        NAME,
        ROLE,
        SHIFT,
        STATUS,
        ACTIVE_ASSIGNMENTS,
        COMPLETED_TODAY,
        RATING,
        SPECIALTIES,
        DEPARTMENT,
    ];
}

/// Decode a domain object from a raw record
pub trait FromRecord: Sized {
    const COLLECTION: Collection;

    fn from_record(raw: &RawRecord) -> Result<Self>;
}

/// Encode a domain object as a full raw record
pub trait ToRecord {
    fn to_record(&self) -> RawRecord;
}

/// A relation field: either a bare identifier or an embedded record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationRef {
    Id(i64),
    IdText(String),
    Embedded {
        #[serde(rename = "Id")]
        id: Value,
        #[serde(rename = "Name", default)]
        name: Option<String>,
    },
}

impl RelationRef {
    pub fn id(&self) -> Option<RecordId> {
        match self {
            RelationRef::Id(id) => Some(RecordId(*id)),
            RelationRef::IdText(text) => text.trim().parse().ok(),
            RelationRef::Embedded { id, .. } => match id {
                Value::Number(n) => n.as_i64().map(RecordId),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            },
        }
    }
}

/// Format a timestamp the way the store writes them
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Split a comma-joined list; blank input is an empty list
pub fn split_list(text: Option<&str>) -> Vec<String> {
    match text {
        Some(text) if !text.trim().is_empty() => {
            text.split(',').map(|item| item.trim().to_string()).collect()
        }
        _ => Vec::new(),
    }
}

pub fn join_list(items: &[String]) -> String {
    items.join(",")
}

/// Encode a list as the JSON string stored in a text field
pub fn encode_json_list<T: Serialize>(items: &[T]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

/// Typed, error-reporting access to the fields of one raw record
pub struct FieldReader<'a> {
    collection: Collection,
    raw: &'a RawRecord,
}

impl<'a> FieldReader<'a> {
    pub fn new(collection: Collection, raw: &'a RawRecord) -> Self {
        Self { collection, raw }
    }

    fn malformed(&self, field: &'static str, reason: impl Into<String>) -> Error {
        Error::MalformedField {
            collection: self.collection.as_str(),
            field,
            reason: reason.into(),
        }
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.raw.get(field).filter(|value| !value.is_null())
    }

    pub fn id(&self) -> Result<RecordId> {
        record_id(self.raw).ok_or_else(|| self.malformed(ID_FIELD, "missing or not an integer"))
    }

    /// Text field; empty strings read as absent, numbers are stringified
    pub fn text(&self, field: &'static str) -> Result<Option<String>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(self.malformed(field, format!("expected text, got {}", other))),
        }
    }

    pub fn integer(&self, field: &'static str) -> Result<Option<i64>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64))
                .map(Some)
                .ok_or_else(|| self.malformed(field, "number out of range")),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(|f| Some(f.round() as i64))
                .map_err(|e| self.malformed(field, e.to_string())),
            Some(other) => Err(self.malformed(field, format!("expected number, got {}", other))),
        }
    }

    pub fn decimal(&self, field: &'static str) -> Result<Option<f64>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| self.malformed(field, e.to_string())),
            Some(other) => Err(self.malformed(field, format!("expected number, got {}", other))),
        }
    }

    /// Boolean flag; absent reads as false
    pub fn flag(&self, field: &'static str) -> Result<bool> {
        match self.present(field) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "" | "false" | "0" => Ok(false),
                "true" | "1" => Ok(true),
                _ => Err(self.malformed(field, format!("expected boolean, got {:?}", s))),
            },
            Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
            Some(other) => Err(self.malformed(field, format!("expected boolean, got {}", other))),
        }
    }

    /// RFC 3339 timestamp; empty reads as absent
    pub fn timestamp(&self, field: &'static str) -> Result<Option<DateTime<Utc>>> {
        match self.text(field)? {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| self.malformed(field, e.to_string())),
        }
    }

    pub fn list(&self, field: &'static str) -> Result<Vec<String>> {
        Ok(split_list(self.text(field)?.as_deref()))
    }

    /// JSON-encoded list stored in a text field
    pub fn json_list<T: DeserializeOwned>(&self, field: &'static str) -> Result<Vec<T>> {
        match self.present(field) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
            Some(Value::String(s)) => {
                serde_json::from_str(s).map_err(|e| self.malformed(field, e.to_string()))
            }
            // Some stores hand back the decoded array directly
            Some(Value::Array(items)) => serde_json::from_value(Value::Array(items.clone()))
                .map_err(|e| self.malformed(field, e.to_string())),
            Some(other) => Err(self.malformed(field, format!("expected JSON list, got {}", other))),
        }
    }

    pub fn relation(&self, field: &'static str) -> Result<Option<RecordId>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(value) => {
                let relation: RelationRef = serde_json::from_value(value.clone())
                    .map_err(|e| self.malformed(field, e.to_string()))?;
                relation
                    .id()
                    .map(Some)
                    .ok_or_else(|| self.malformed(field, format!("no usable Id in {}", value)))
            }
        }
    }

    pub fn parsed<T>(
        &self,
        field: &'static str,
        parse: fn(&str) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.text(field)? {
            None => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| self.malformed(field, format!("unknown value {:?}", s))),
        }
    }
}

impl FromRecord for Room {
    const COLLECTION: Collection = Collection::Rooms;

    fn from_record(raw: &RawRecord) -> Result<Self> {
        use room_fields::*;
        let r = FieldReader::new(Self::COLLECTION, raw);

        Ok(Room {
            id: r.id()?,
            name: r.text(NAME_FIELD)?,
            room_number: r.text(ROOM_NUMBER)?.unwrap_or_default(),
            floor: r.integer(FLOOR)?,
            room_type: r.text(ROOM_TYPE)?,
            status: r
                .parsed(STATUS, RoomStatus::parse)?
                .ok_or_else(|| r.malformed(STATUS, "missing"))?,
            nightly_rate: r.decimal(NIGHTLY_RATE)?,
            guest_name: r.text(GUEST_NAME)?,
            checkin_time: r.timestamp(CHECKIN_TIME)?,
            checkout_time: r.timestamp(CHECKOUT_TIME)?,
            blocked: r.flag(BLOCKED)?,
            block_reason: r.text(BLOCK_REASON)?,
            last_updated: r.timestamp(LAST_UPDATED)?,
            notes: r.json_list::<Note>(NOTES)?,
            status_history: r.json_list::<StatusHistoryEntry>(STATUS_HISTORY)?,
        })
    }
}

fn opt_text(value: &Option<String>) -> Value {
    value.clone().map(Value::from).unwrap_or(Value::Null)
}

fn opt_timestamp(value: &Option<DateTime<Utc>>) -> Value {
    value
        .as_ref()
        .map(|ts| Value::from(format_timestamp(ts)))
        .unwrap_or(Value::Null)
}

fn json_text<T: Serialize>(items: &[T]) -> Value {
    // Serializing plain data structs into a string cannot fail
    encode_json_list(items)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from("[]"))
}

impl ToRecord for Room {
    fn to_record(&self) -> RawRecord {
        use room_fields::*;
        let mut raw = RawRecord::new();
        raw.insert(ID_FIELD.into(), self.id.0.into());
        raw.insert(NAME_FIELD.into(), opt_text(&self.name));
        raw.insert(ROOM_NUMBER.into(), self.room_number.clone().into());
        raw.insert(FLOOR.into(), self.floor.map(Value::from).unwrap_or(Value::Null));
        raw.insert(ROOM_TYPE.into(), opt_text(&self.room_type));
        raw.insert(STATUS.into(), self.status.as_str().into());
        raw.insert(
            NIGHTLY_RATE.into(),
            self.nightly_rate.map(Value::from).unwrap_or(Value::Null),
        );
        raw.insert(GUEST_NAME.into(), opt_text(&self.guest_name));
        raw.insert(CHECKIN_TIME.into(), opt_timestamp(&self.checkin_time));
        raw.insert(CHECKOUT_TIME.into(), opt_timestamp(&self.checkout_time));
        raw.insert(BLOCKED.into(), self.blocked.into());
        raw.insert(BLOCK_REASON.into(), opt_text(&self.block_reason));
        raw.insert(LAST_UPDATED.into(), opt_timestamp(&self.last_updated));
        raw.insert(NOTES.into(), json_text(&self.notes));
        raw.insert(STATUS_HISTORY.into(), json_text(&self.status_history));
        raw
    }
}

impl FromRecord for HousekeepingTask {
    const COLLECTION: Collection = Collection::HousekeepingTasks;

    fn from_record(raw: &RawRecord) -> Result<Self> {
        use task_fields::*;
        let r = FieldReader::new(Self::COLLECTION, raw);

        Ok(HousekeepingTask {
            id: r.id()?,
            name: r.text(NAME_FIELD)?,
            room_number: r.text(ROOM_NUMBER)?.unwrap_or_default(),
            room_id: r.relation(ROOM_ID)?,
            status: r
                .parsed(STATUS, TaskStatus::parse)?
                .ok_or_else(|| r.malformed(STATUS, "missing"))?,
            assigned_to: r.relation(ASSIGNED_TO)?,
            assigned_staff: r.text(ASSIGNED_STAFF)?,
            priority: r.parsed(PRIORITY, TaskPriority::parse)?.unwrap_or_default(),
            estimated_time: r.integer(ESTIMATED_TIME)?,
            actual_time: r.integer(ACTUAL_TIME)?,
            start_time: r.timestamp(START_TIME)?,
            completed_time: r.timestamp(COMPLETED_TIME)?,
            task_type: r
                .text(TASK_TYPE)?
                .unwrap_or_else(|| DEFAULT_TASK_TYPE.to_string()),
            special_instructions: r.text(SPECIAL_INSTRUCTIONS)?,
            supplies: r.list(SUPPLIES)?,
            created_at: r.timestamp(CREATED_AT)?,
            created_by: r.text(CREATED_BY)?,
        })
    }
}

impl ToRecord for HousekeepingTask {
    fn to_record(&self) -> RawRecord {
        use task_fields::*;
        let mut raw = RawRecord::new();
        raw.insert(ID_FIELD.into(), self.id.0.into());
        raw.insert(NAME_FIELD.into(), opt_text(&self.name));
        raw.insert(ROOM_NUMBER.into(), self.room_number.clone().into());
        raw.insert(
            ROOM_ID.into(),
            self.room_id.map(|id| Value::from(id.0)).unwrap_or(Value::Null),
        );
        raw.insert(STATUS.into(), self.status.as_str().into());
        raw.insert(
            ASSIGNED_TO.into(),
            self.assigned_to.map(|id| Value::from(id.0)).unwrap_or(Value::Null),
        );
        raw.insert(ASSIGNED_STAFF.into(), opt_text(&self.assigned_staff));
        raw.insert(PRIORITY.into(), self.priority.as_str().into());
        raw.insert(
            ESTIMATED_TIME.into(),
            self.estimated_time.map(Value::from).unwrap_or(Value::Null),
        );
        raw.insert(
            ACTUAL_TIME.into(),
            self.actual_time.map(Value::from).unwrap_or(Value::Null),
        );
        raw.insert(START_TIME.into(), opt_timestamp(&self.start_time));
        raw.insert(COMPLETED_TIME.into(), opt_timestamp(&self.completed_time));
        raw.insert(TASK_TYPE.into(), self.task_type.clone().into());
        raw.insert(
            SPECIAL_INSTRUCTIONS.into(),
            opt_text(&self.special_instructions),
        );
        raw.insert(SUPPLIES.into(), join_list(&self.supplies).into());
        raw.insert(CREATED_AT.into(), opt_timestamp(&self.created_at));
        raw.insert(CREATED_BY.into(), opt_text(&self.created_by));
        raw
    }
}

impl FromRecord for Staff {
    const COLLECTION: Collection = Collection::Staff;

    fn from_record(raw: &RawRecord) -> Result<Self> {
        use staff_fields::*;
        let r = FieldReader::new(Self::COLLECTION, raw);

        Ok(Staff {
            id: r.id()?,
            name: r.text(NAME)?.unwrap_or_default(),
            role: r.text(ROLE)?,
            shift: r.text(SHIFT)?,
            status: r.text(STATUS)?,
            active_assignments: r.integer(ACTIVE_ASSIGNMENTS)?.unwrap_or(0),
            completed_today: r.integer(COMPLETED_TODAY)?.unwrap_or(0),
            rating: r.decimal(RATING)?,
            specialties: r.list(SPECIALTIES)?,
            department: r.text(DEPARTMENT)?,
        })
    }
}

impl ToRecord for Staff {
    fn to_record(&self) -> RawRecord {
        use staff_fields::*;
        let mut raw = RawRecord::new();
        raw.insert(ID_FIELD.into(), self.id.0.into());
        raw.insert(NAME.into(), self.name.clone().into());
        raw.insert(ROLE.into(), opt_text(&self.role));
        raw.insert(SHIFT.into(), opt_text(&self.shift));
        raw.insert(STATUS.into(), opt_text(&self.status));
        raw.insert(ACTIVE_ASSIGNMENTS.into(), self.active_assignments.into());
        raw.insert(COMPLETED_TODAY.into(), self.completed_today.into());
        raw.insert(RATING.into(), self.rating.map(Value::from).unwrap_or(Value::Null));
        raw.insert(SPECIALTIES.into(), join_list(&self.specialties).into());
        raw.insert(DEPARTMENT.into(), opt_text(&self.department));
        raw
    }
}

impl NewTask {
    /// Record payload for `create_records`, defaults filled in
    pub fn to_record(&self, created_by: &str, now: DateTime<Utc>) -> RawRecord {
        use task_fields::*;
        let mut raw = RawRecord::new();
        raw.insert(NAME_FIELD.into(), self.display_name().into());
        raw.insert(ROOM_NUMBER.into(), self.room_number.clone().into());
        raw.insert(ROOM_ID.into(), self.room_id.0.into());
        raw.insert(STATUS.into(), TaskStatus::Pending.as_str().into());
        raw.insert(
            PRIORITY.into(),
            self.priority.unwrap_or_default().as_str().into(),
        );
        raw.insert(
            ESTIMATED_TIME.into(),
            self.estimated_time
                .unwrap_or(DEFAULT_ESTIMATED_MINUTES)
                .into(),
        );
        raw.insert(
            TASK_TYPE.into(),
            self.task_type
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TASK_TYPE.to_string())
                .into(),
        );
        raw.insert(
            SPECIAL_INSTRUCTIONS.into(),
            self.special_instructions.clone().unwrap_or_default().into(),
        );
        raw.insert(SUPPLIES.into(), join_list(&self.supplies).into());
        raw.insert(CREATED_AT.into(), format_timestamp(&now).into());
        raw.insert(CREATED_BY.into(), created_by.into());
        raw
    }
}

/// Decode a batch of records, skipping (and logging) the ones that fail
pub fn decode_all<T: FromRecord>(records: &[RawRecord]) -> Vec<T> {
    let collection = T::COLLECTION;
    records
        .iter()
        .filter_map(|raw| match T::from_record(raw) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(
                    collection = %collection,
                    id = ?record_id(raw),
                    error = %e,
                    "Skipping record that failed to map"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_supplies_unset_is_empty() {
        let task = HousekeepingTask::from_record(&raw(json!({
            "Id": 1, "room_number_c": "101", "status_c": "pending"
        })))
        .unwrap();
        assert!(task.supplies.is_empty());

        let task = HousekeepingTask::from_record(&raw(json!({
            "Id": 1, "room_number_c": "101", "status_c": "pending", "supplies_c": ""
        })))
        .unwrap();
        assert!(task.supplies.is_empty());
    }

    #[test]
    fn test_supplies_split_in_order() {
        let task = HousekeepingTask::from_record(&raw(json!({
            "Id": 1, "room_number_c": "101", "status_c": "pending", "supplies_c": "a,b,c"
        })))
        .unwrap();
        assert_eq!(task.supplies, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_relation_forms() {
        for value in [json!(7), json!("7"), json!({"Id": 7, "Name": "Room 101"})] {
            let task = HousekeepingTask::from_record(&raw(json!({
                "Id": 1, "room_number_c": "101", "status_c": "pending", "room_id_c": value
            })))
            .unwrap();
            assert_eq!(task.room_id, Some(RecordId(7)));
        }

        let task = HousekeepingTask::from_record(&raw(json!({
            "Id": 1, "room_number_c": "101", "status_c": "pending", "assigned_to_c": null
        })))
        .unwrap();
        assert_eq!(task.assigned_to, None);
    }

    #[test]
    fn test_relation_without_id_is_malformed() {
        let err = HousekeepingTask::from_record(&raw(json!({
            "Id": 1, "room_number_c": "101", "status_c": "pending", "room_id_c": {"Name": "x"}
        })))
        .unwrap_err();
        assert!(matches!(err, Error::MalformedField { field: "room_id_c", .. }));
    }

    #[test]
    fn test_room_notes_decode() {
        let notes = r#"[{"id":1,"content":"Extra towels","timestamp":"2024-05-01T09:00:00.000Z","addedBy":"Front Desk","type":"General"}]"#;
        let room = Room::from_record(&raw(json!({
            "Id": 3,
            "room_number_c": 101,
            "status_c": "Occupied",
            "guest_name_c": "Ada Lovelace",
            "checkin_time_c": "2024-05-01T14:00:00.000Z",
            "notes_c": notes,
            "blocked_c": null
        })))
        .unwrap();

        assert_eq!(room.room_number, "101");
        assert_eq!(room.notes.len(), 1);
        assert_eq!(room.notes[0].author, "Front Desk");
        assert!(room.status_history.is_empty());
        assert!(!room.blocked);
        assert_eq!(
            room.checkin_time,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_malformed_notes_is_an_error() {
        let err = Room::from_record(&raw(json!({
            "Id": 3, "room_number_c": "101", "status_c": "Available", "notes_c": "[{oops"
        })))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedField { collection: "room_c", field: "notes_c", .. }
        ));
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        let err = Room::from_record(&raw(json!({
            "Id": 3, "room_number_c": "101", "status_c": "Haunted"
        })))
        .unwrap_err();
        assert!(matches!(err, Error::MalformedField { field: "status_c", .. }));
    }

    #[test]
    fn test_staff_counts_default_to_zero() {
        let staff = Staff::from_record(&raw(json!({
            "Id": 5, "name_c": "Maria", "specialties_c": "deep_clean,laundry"
        })))
        .unwrap();
        assert_eq!(staff.active_assignments, 0);
        assert_eq!(staff.completed_today, 0);
        assert_eq!(staff.specialties, vec!["deep_clean", "laundry"]);
    }

    #[test]
    fn test_room_mapping_is_consistent_both_ways() {
        let mut room = Room::new(RecordId(9), "305".to_string(), RoomStatus::Occupied);
        room.floor = Some(3);
        room.guest_name = Some("Grace Hopper".to_string());
        room.checkin_time = Some(Utc.with_ymd_and_hms(2024, 6, 2, 15, 0, 0).unwrap());
        room.notes.push(Note {
            id: 42,
            content: "VIP".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 2, 15, 5, 0).unwrap(),
            author: "Manager".to_string(),
            category: "General".to_string(),
        });

        let back = Room::from_record(&room.to_record()).unwrap();
        assert_eq!(back, room);
    }

    #[test]
    fn test_task_mapping_is_consistent_both_ways() {
        let mut task = HousekeepingTask::new(RecordId(2), "210".to_string(), TaskStatus::Completed);
        task.room_id = Some(RecordId(12));
        task.assigned_to = Some(RecordId(5));
        task.actual_time = Some(25);
        task.supplies = vec!["towels".to_string(), "soap".to_string()];
        task.completed_time = Some(Utc.with_ymd_and_hms(2024, 6, 2, 11, 0, 0).unwrap());

        let back = HousekeepingTask::from_record(&task.to_record()).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_new_task_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap();
        let raw = NewTask::new("118".to_string(), RecordId(18)).to_record("Front Desk", now);

        assert_eq!(raw[NAME_FIELD], "Task for Room 118");
        assert_eq!(raw[task_fields::STATUS], "pending");
        assert_eq!(raw[task_fields::PRIORITY], "medium");
        assert_eq!(raw[task_fields::ESTIMATED_TIME], 30);
        assert_eq!(raw[task_fields::TASK_TYPE], "standard_cleaning");
        assert_eq!(raw[task_fields::SUPPLIES], "");
        assert_eq!(raw[task_fields::CREATED_AT], "2024-06-02T08:00:00.000Z");
        assert_eq!(raw[task_fields::CREATED_BY], "Front Desk");
        assert!(!raw.contains_key(ID_FIELD));
    }

    #[test]
    fn test_decode_all_skips_bad_records() {
        let records = vec![
            raw(json!({"Id": 1, "room_number_c": "101", "status_c": "Available"})),
            raw(json!({"Id": 2, "room_number_c": "102", "status_c": "Available", "notes_c": "nope"})),
        ];
        let rooms: Vec<Room> = decode_all(&records);
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, RecordId(1));
    }
}
