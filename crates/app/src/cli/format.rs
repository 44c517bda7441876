//! Output formatting for CLI display.

use grandview_core::{BulkOutcome, HousekeepingStats, HousekeepingTask, Room, Staff};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub(super) fn format_room(room: &Room) -> String {
    let mut line = format!("{:<6} {:<14}", room.room_number, room.status.as_str());

    if let Some(guest) = room.guest_name.as_deref().filter(|g| !g.is_empty()) {
        line.push_str(&format!(" guest: {guest}"));
        if let Some(checkout) = room.checkout_time {
            line.push_str(&format!(" (out {})", checkout.format(TIME_FORMAT)));
        }
    }
    if room.blocked {
        let reason = room.block_reason.as_deref().unwrap_or("");
        line.push_str(&format!(" blocked: {reason}"));
    }
    if !room.notes.is_empty() {
        line.push_str(&format!(" [{} notes]", room.notes.len()));
    }
    line
}

pub(super) fn format_rooms(rooms: &[Room]) -> String {
    if rooms.is_empty() {
        return "No rooms.".to_string();
    }
    rooms.iter().map(format_room).collect::<Vec<_>>().join("\n")
}

pub(super) fn format_tasks(tasks: &[HousekeepingTask]) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }
    tasks
        .iter()
        .map(|t| {
            let staff = t.assigned_staff.as_deref().unwrap_or("unassigned");
            let name = t.name.as_deref().unwrap_or(&t.task_type);
            format!(
                "#{:<4} room {:<6} {:<12} {:<7} {} ({staff})",
                t.id.value(),
                t.room_number,
                t.status.as_str(),
                t.priority.as_str(),
                name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn format_staff(staff: &[Staff]) -> String {
    if staff.is_empty() {
        return "No staff.".to_string();
    }
    staff
        .iter()
        .map(|s| {
            let role = s.role.as_deref().unwrap_or("-");
            format!(
                "#{:<4} {:<20} {:<14} active {} done today {}",
                s.id.value(), s.name, role, s.active_assignments, s.completed_today
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn format_stats(stats: &HousekeepingStats) -> String {
    format!(
        "tasks: {} total, {} pending, {} in progress, {} completed today\n\
         average time: {} min\n\
         staff: {}",
        stats.total_tasks,
        stats.pending_tasks,
        stats.in_progress_tasks,
        stats.completed_today,
        stats.average_time,
        stats.staff_stats.len()
    )
}

pub(super) fn format_bulk(outcome: &BulkOutcome<Room>) -> String {
    let mut lines = vec![format!(
        "{} updated, {} failed",
        outcome.succeeded.len(),
        outcome.failed.len()
    )];
    lines.extend(
        outcome
            .failed
            .iter()
            .map(|f| format!("  room #{}: {}", f.id, f.message)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use grandview_core::{BulkFailure, RecordId, RoomStatus};

    #[test]
    fn test_format_room_with_guest_and_block() {
        let mut room = Room::new(RecordId(1), "101".to_string(), RoomStatus::OutOfOrder);
        room.guest_name = Some(String::new());
        room.blocked = true;
        room.block_reason = Some("Leak".to_string());

        let line = format_room(&room);
        assert!(line.starts_with("101"));
        assert!(line.contains("Out of Order"));
        assert!(line.contains("blocked: Leak"));
        assert!(!line.contains("guest"));
    }

    #[test]
    fn test_format_bulk_lists_failures() {
        let outcome: BulkOutcome<Room> = BulkOutcome {
            succeeded: vec![Room::new(RecordId(1), "101".to_string(), RoomStatus::Cleaning)],
            failed: vec![BulkFailure {
                id: RecordId(2),
                message: "Record locked".to_string(),
            }],
        };
        assert_eq!(
            format_bulk(&outcome),
            "1 updated, 1 failed\n  room #2: Record locked"
        );
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_rooms(&[]), "No rooms.");
        assert_eq!(format_tasks(&[]), "No tasks.");
        assert_eq!(format_stats(&HousekeepingStats::default()).lines().count(), 3);
    }
}
