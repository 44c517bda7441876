//! Notes and status history embedded in a room record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RoomStatus;

/// Default note category
pub const GENERAL_NOTE: &str = "General";

/// A free-text note attached to a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Millisecond timestamp at creation, unique enough per room
    pub id: i64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "addedBy")]
    pub author: String,
    #[serde(rename = "type", default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    GENERAL_NOTE.to_string()
}

impl Note {
    pub fn new(content: String, author: String) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            content,
            timestamp: now,
            author,
            category: default_category(),
        }
    }

    pub fn with_category(mut self, category: String) -> Self {
        self.category = category;
        self
    }
}

/// One entry of a room's status trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: RoomStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "changedBy", default, skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
