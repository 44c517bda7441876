//! Room model - one line of the room status board

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Note, RecordId, StatusHistoryEntry};

/// Room status as stored in `status_c`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomStatus {
    Available,
    Occupied,
    Cleaning,
    Maintenance,
    #[serde(rename = "Out of Order")]
    OutOfOrder,
}

impl RoomStatus {
    /// The exact string the record store uses
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "Available",
            RoomStatus::Occupied => "Occupied",
            RoomStatus::Cleaning => "Cleaning",
            RoomStatus::Maintenance => "Maintenance",
            RoomStatus::OutOfOrder => "Out of Order",
        }
    }

    /// Parse a stored status string, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
    }

    pub fn all() -> &'static [RoomStatus] {
        &[
            RoomStatus::Available,
            RoomStatus::Occupied,
            RoomStatus::Cleaning,
            RoomStatus::Maintenance,
            RoomStatus::OutOfOrder,
        ]
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hotel room as shown on the status board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RecordId,
    pub name: Option<String>,
    pub room_number: String,
    pub floor: Option<i64>,
    pub room_type: Option<String>,
    pub status: RoomStatus,
    pub nightly_rate: Option<f64>,
    pub guest_name: Option<String>,
    pub checkin_time: Option<DateTime<Utc>>,
    pub checkout_time: Option<DateTime<Utc>>,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub notes: Vec<Note>,
    pub status_history: Vec<StatusHistoryEntry>,
}

impl Room {
    pub fn new(id: RecordId, room_number: String, status: RoomStatus) -> Self {
        Self {
            id,
            name: None,
            room_number,
            floor: None,
            room_type: None,
            status,
            nightly_rate: None,
            guest_name: None,
            checkin_time: None,
            checkout_time: None,
            blocked: false,
            block_reason: None,
            last_updated: None,
            notes: Vec::new(),
            status_history: Vec::new(),
        }
    }

    /// Whether a guest is still associated with the room
    pub fn has_guest(&self) -> bool {
        self.guest_name.as_deref().is_some_and(|g| !g.trim().is_empty())
    }
}

/// Guest details for a check-in
#[derive(Debug, Clone, Default)]
pub struct GuestAssignment {
    pub guest_name: String,
    /// Defaults to the time of the call
    pub checkin_time: Option<DateTime<Utc>>,
    pub checkout_time: Option<DateTime<Utc>>,
}

impl GuestAssignment {
    pub fn new(guest_name: String) -> Self {
        Self {
            guest_name,
            ..Default::default()
        }
    }
}
