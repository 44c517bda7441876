//! Staff model

use serde::{Deserialize, Serialize};

use super::RecordId;

/// A housekeeping staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: RecordId,
    pub name: String,
    pub role: Option<String>,
    pub shift: Option<String>,
    pub status: Option<String>,
    pub active_assignments: i64,
    pub completed_today: i64,
    pub rating: Option<f64>,
    pub specialties: Vec<String>,
    pub department: Option<String>,
}
