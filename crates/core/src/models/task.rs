//! Housekeeping task model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecordId;

/// Task type used when none is given
pub const DEFAULT_TASK_TYPE: &str = "standard_cleaning";

/// Estimated minutes used when none is given
pub const DEFAULT_ESTIMATED_MINUTES: i64 = 30;

/// Task status as stored in `status_c`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
    }

    /// Human form used in notices ("in progress")
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn all() -> &'static [TaskStatus] {
        &[
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ]
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task priority as stored in `priority_c`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            "urgent" => Some(TaskPriority::Urgent),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A housekeeping task tied to a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousekeepingTask {
    pub id: RecordId,
    pub name: Option<String>,
    pub room_number: String,
    pub room_id: Option<RecordId>,
    pub status: TaskStatus,
    pub assigned_to: Option<RecordId>,
    /// Display name copied from the staff record at assignment time
    pub assigned_staff: Option<String>,
    pub priority: TaskPriority,
    /// Minutes
    pub estimated_time: Option<i64>,
    /// Minutes
    pub actual_time: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub completed_time: Option<DateTime<Utc>>,
    pub task_type: String,
    pub special_instructions: Option<String>,
    pub supplies: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

impl HousekeepingTask {
    pub fn new(id: RecordId, room_number: String, status: TaskStatus) -> Self {
        Self {
            id,
            name: None,
            room_number,
            room_id: None,
            status,
            assigned_to: None,
            assigned_staff: None,
            priority: TaskPriority::default(),
            estimated_time: None,
            actual_time: None,
            start_time: None,
            completed_time: None,
            task_type: DEFAULT_TASK_TYPE.to_string(),
            special_instructions: None,
            supplies: Vec::new(),
            created_at: None,
            created_by: None,
        }
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: Option<String>,
    pub room_number: String,
    pub room_id: RecordId,
    pub priority: Option<TaskPriority>,
    pub estimated_time: Option<i64>,
    pub task_type: Option<String>,
    pub special_instructions: Option<String>,
    pub supplies: Vec<String>,
}

impl NewTask {
    pub fn new(room_number: String, room_id: RecordId) -> Self {
        Self {
            room_number,
            room_id,
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Task for Room {}", self.room_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_label() {
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("done"), None);
        assert_eq!(TaskStatus::InProgress.label(), "in progress");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Urgent > TaskPriority::High);
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_new_task_display_name() {
        let task = NewTask::new("204".to_string(), RecordId(4));
        assert_eq!(task.display_name(), "Task for Room 204");

        let named = NewTask {
            name: Some("Deep clean".to_string()),
            ..task
        };
        assert_eq!(named.display_name(), "Deep clean");
    }
}
