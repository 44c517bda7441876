//! Developer guardrails and invariants
//!
//! Debug assertions over the records the façades build and receive.
//! These checks are compiled out in release builds.

use serde_json::Value;

use crate::mapper::{room_fields, task_fields};
use crate::models::{Room, RoomStatus, TaskStatus};
use crate::transitions::{RoomPatch, TaskPatch};

/// Validate that an outgoing room patch keeps the room consistent
pub fn assert_room_patch_invariants(patch: &RoomPatch) {
    let status = patch
        .get(room_fields::STATUS)
        .and_then(Value::as_str)
        .and_then(RoomStatus::parse);

    // Blocking must take the room out of order
    if patch.get(room_fields::BLOCKED) == Some(&Value::Bool(true)) {
        debug_assert!(
            status == Some(RoomStatus::OutOfOrder),
            "Room patch blocks the room but sets status {:?}",
            status
        );
    }

    // Becoming available must drop the previous stay
    if status == Some(RoomStatus::Available) {
        debug_assert!(
            patch.get(room_fields::GUEST_NAME) == Some(&Value::from(""))
                && patch.get(room_fields::CHECKIN_TIME) == Some(&Value::Null)
                && patch.get(room_fields::CHECKOUT_TIME) == Some(&Value::Null),
            "Room patch makes the room available without clearing the stay"
        );
    }

    // Leaving out of order must lift the block
    if matches!(status, Some(s) if s != RoomStatus::OutOfOrder) {
        debug_assert!(
            patch.get(room_fields::BLOCKED) == Some(&Value::Bool(false)),
            "Room patch sets status {:?} but leaves the block in place",
            status
        );
    }
}

/// Validate that timestamps only travel with the status that owns them
pub fn assert_task_patch_invariants(patch: &TaskPatch) {
    let status = patch
        .get(task_fields::STATUS)
        .and_then(Value::as_str)
        .and_then(TaskStatus::parse);

    if patch.get(task_fields::START_TIME).is_some() {
        debug_assert!(
            status == Some(TaskStatus::InProgress),
            "Task patch stamps start_time with status {:?}",
            status
        );
    }

    if patch.get(task_fields::COMPLETED_TIME).is_some() {
        debug_assert!(
            status == Some(TaskStatus::Completed),
            "Task patch stamps completed_time with status {:?}",
            status
        );
    }
}

/// Whether a room read back from the store is internally consistent.
/// Other writers can leave the store in any state, so this reports instead of asserting.
pub fn room_is_consistent(room: &Room) -> bool {
    let blocked_ok = !room.blocked || room.status == RoomStatus::OutOfOrder;
    let available_ok = room.status != RoomStatus::Available
        || (!room.has_guest() && room.checkin_time.is_none() && room.checkout_time.is_none());
    blocked_ok && available_ok
}
