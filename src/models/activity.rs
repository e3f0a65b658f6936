use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::ActivityType;

/// Append-only audit record; one entry per mutating operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub user_id: String,
    pub user_name: String,
    pub activity: ActivityType,
    pub details: String,
}
