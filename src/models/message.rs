use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Chat message tied to an appointment. The chat collaborator owns the
/// conversation flow; the record lives here so user deletion can purge it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub appointment_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    pub sent_at: NaiveDateTime,
    pub is_ai: bool,
}
