//! Activity trail — the audit collaborator's write side.
//!
//! Recording is fire-and-forget: a failed write must never fail the mutation
//! that triggered it, so errors are downgraded to a warning.

use chrono::Local;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{insert_activity, recent_activity as recent_rows};
use crate::db::DatabaseError;
use crate::models::enums::ActivityType;
use crate::models::ActivityEntry;

pub fn record(
    conn: &Connection,
    user_id: &str,
    user_name: &str,
    activity: ActivityType,
    details: &str,
) {
    let entry = ActivityEntry {
        id: format!("log-{}", Uuid::new_v4()),
        timestamp: Local::now().naive_local(),
        user_id: user_id.into(),
        user_name: user_name.into(),
        activity,
        details: details.into(),
    };

    if let Err(e) = insert_activity(conn, &entry) {
        tracing::warn!(error = %e, activity = activity.as_str(), "failed to record activity");
    }
}

pub fn recent(conn: &Connection, limit: u32) -> Result<Vec<ActivityEntry>, DatabaseError> {
    recent_rows(conn, limit)
}
