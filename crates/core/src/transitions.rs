//! Status transitions and the field changes that travel with them
//!
//! Everything here is pure: it decides whether a transition is allowed and
//! builds the partial record to send. The services do the remote calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::gateway::{RawRecord, ID_FIELD};
use crate::mapper::{encode_json_list, format_timestamp, join_list, room_fields, task_fields};
use crate::models::{GuestAssignment, Note, RecordId, RoomStatus, TaskPriority, TaskStatus};

/// How status changes are vetted before they are sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Any status may move to any status
    #[default]
    Unrestricted,
    /// Only transitions in the tables below
    Strict,
}

impl TransitionPolicy {
    pub fn check_room(&self, from: RoomStatus, to: RoomStatus) -> Result<()> {
        match self {
            TransitionPolicy::Unrestricted => Ok(()),
            TransitionPolicy::Strict if room_transition_allowed(from, to) => Ok(()),
            TransitionPolicy::Strict => Err(Error::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    pub fn check_task(&self, from: TaskStatus, to: TaskStatus) -> Result<()> {
        match self {
            TransitionPolicy::Unrestricted => Ok(()),
            TransitionPolicy::Strict if task_transition_allowed(from, to) => Ok(()),
            TransitionPolicy::Strict => Err(Error::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

/// Room transition table
pub fn room_transition_allowed(from: RoomStatus, to: RoomStatus) -> bool {
    use RoomStatus::*;

    if from == to {
        return true;
    }

    matches!(
        (from, to),
        (Available, Occupied | Cleaning | Maintenance | OutOfOrder)
            | (Occupied, Cleaning | Available)
            | (Cleaning, Available | Maintenance | OutOfOrder)
            | (Maintenance, Available | Cleaning | OutOfOrder)
            | (OutOfOrder, Available)
    )
}

/// Task transition table
pub fn task_transition_allowed(from: TaskStatus, to: TaskStatus) -> bool {
    use TaskStatus::*;

    if from == to {
        return true;
    }

    matches!(
        (from, to),
        (Pending, InProgress | Cancelled)
            | (InProgress, Completed | Pending)
            | (Completed, Pending)
            | (Cancelled, Pending)
    )
}

fn timestamp_value(ts: Option<DateTime<Utc>>) -> Value {
    ts.map(|ts| Value::from(format_timestamp(&ts)))
        .unwrap_or(Value::Null)
}

/// Partial room record. Fields left out are not touched by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomPatch {
    fields: RawRecord,
}

impl RoomPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: RoomStatus) -> Self {
        self.fields
            .insert(room_fields::STATUS.into(), status.as_str().into());
        self
    }

    pub fn guest_name(mut self, name: &str) -> Self {
        self.fields.insert(room_fields::GUEST_NAME.into(), name.into());
        self
    }

    /// `None` clears the stored value
    pub fn checkin_time(mut self, ts: Option<DateTime<Utc>>) -> Self {
        self.fields
            .insert(room_fields::CHECKIN_TIME.into(), timestamp_value(ts));
        self
    }

    /// `None` clears the stored value
    pub fn checkout_time(mut self, ts: Option<DateTime<Utc>>) -> Self {
        self.fields
            .insert(room_fields::CHECKOUT_TIME.into(), timestamp_value(ts));
        self
    }

    pub fn blocked(mut self, blocked: bool) -> Self {
        self.fields.insert(room_fields::BLOCKED.into(), blocked.into());
        self
    }

    pub fn block_reason(mut self, reason: &str) -> Self {
        self.fields
            .insert(room_fields::BLOCK_REASON.into(), reason.into());
        self
    }

    pub fn last_updated(mut self, ts: DateTime<Utc>) -> Self {
        self.fields
            .insert(room_fields::LAST_UPDATED.into(), timestamp_value(Some(ts)));
        self
    }

    pub fn notes(mut self, notes: &[Note]) -> Result<Self> {
        self.fields
            .insert(room_fields::NOTES.into(), encode_json_list(notes)?.into());
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn into_record(self, id: RecordId) -> RawRecord {
        let mut raw = self.fields;
        raw.insert(ID_FIELD.into(), id.0.into());
        raw
    }
}

/// Partial task record. Fields left out are not touched by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    fields: RawRecord,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.fields
            .insert(task_fields::STATUS.into(), status.as_str().into());
        self
    }

    pub(crate) fn start_time(mut self, ts: DateTime<Utc>) -> Self {
        self.fields
            .insert(task_fields::START_TIME.into(), timestamp_value(Some(ts)));
        self
    }

    pub(crate) fn completed_time(mut self, ts: DateTime<Utc>) -> Self {
        self.fields
            .insert(task_fields::COMPLETED_TIME.into(), timestamp_value(Some(ts)));
        self
    }

    /// Minutes actually spent
    pub fn actual_time(mut self, minutes: i64) -> Self {
        self.fields
            .insert(task_fields::ACTUAL_TIME.into(), minutes.into());
        self
    }

    pub fn assigned_to(mut self, staff_id: RecordId, staff_name: &str) -> Self {
        self.fields
            .insert(task_fields::ASSIGNED_TO.into(), staff_id.0.into());
        self.fields
            .insert(task_fields::ASSIGNED_STAFF.into(), staff_name.into());
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.fields
            .insert(task_fields::PRIORITY.into(), priority.as_str().into());
        self
    }

    pub fn special_instructions(mut self, text: &str) -> Self {
        self.fields
            .insert(task_fields::SPECIAL_INSTRUCTIONS.into(), text.into());
        self
    }

    pub fn supplies(mut self, supplies: &[String]) -> Self {
        self.fields
            .insert(task_fields::SUPPLIES.into(), join_list(supplies).into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn into_record(self, id: RecordId) -> RawRecord {
        let mut raw = self.fields;
        raw.insert(ID_FIELD.into(), id.0.into());
        raw
    }
}

/// Plain status change. `Available` also wipes the stay, and any status
/// other than `Out of Order` lifts a block
pub fn room_status_patch(status: RoomStatus, now: DateTime<Utc>) -> RoomPatch {
    let mut patch = RoomPatch::new().status(status).last_updated(now);
    if status != RoomStatus::OutOfOrder {
        patch = patch.blocked(false).block_reason("");
    }
    if status == RoomStatus::Available {
        patch = patch.guest_name("").checkin_time(None).checkout_time(None);
    }
    patch
}

/// Check a guest in. A missing checkout time clears the previous one
pub fn assign_guest_patch(guest: &GuestAssignment, now: DateTime<Utc>) -> RoomPatch {
    room_status_patch(RoomStatus::Occupied, now)
        .guest_name(&guest.guest_name)
        .checkin_time(Some(guest.checkin_time.unwrap_or(now)))
        .checkout_time(guest.checkout_time)
}

/// Hand the room to housekeeping; the guest stays attached
pub fn checkout_patch(now: DateTime<Utc>) -> RoomPatch {
    room_status_patch(RoomStatus::Cleaning, now)
}

pub fn block_patch(reason: &str, now: DateTime<Utc>) -> RoomPatch {
    RoomPatch::new()
        .status(RoomStatus::OutOfOrder)
        .blocked(true)
        .block_reason(reason)
        .last_updated(now)
}

pub fn unblock_patch(now: DateTime<Utc>) -> RoomPatch {
    room_status_patch(RoomStatus::Available, now)
}

/// Task status change with its timestamp side effect.
/// Caller-supplied fields go out in the same update; the status and stamps win.
pub fn task_status_patch(status: TaskStatus, extra: TaskPatch, now: DateTime<Utc>) -> TaskPatch {
    let patch = extra.status(status);
    match status {
        TaskStatus::InProgress => patch.start_time(now),
        TaskStatus::Completed => patch.completed_time(now),
        TaskStatus::Pending | TaskStatus::Cancelled => patch,
    }
}
