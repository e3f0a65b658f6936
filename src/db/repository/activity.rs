use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::ActivityEntry;

use super::{parse_datetime, DATETIME_FORMAT};

pub fn insert_activity(conn: &Connection, entry: &ActivityEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO activity_log (id, timestamp, user_id, user_name, activity, details)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.id,
            entry.timestamp.format(DATETIME_FORMAT).to_string(),
            entry.user_id,
            entry.user_name,
            entry.activity.as_str(),
            entry.details,
        ],
    )?;
    Ok(())
}

pub fn recent_activity(conn: &Connection, limit: u32) -> Result<Vec<ActivityEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, user_id, user_name, activity, details
         FROM activity_log ORDER BY timestamp DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], read_activity_row)?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?.try_into()?);
    }
    Ok(entries)
}

/// Prune activity entries older than the given number of days.
pub fn prune_activity_log(conn: &Connection, retention_days: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM activity_log WHERE timestamp < datetime('now', ?1)",
        params![format!("-{retention_days} days")],
    )?;
    Ok(deleted)
}

struct ActivityRow {
    id: String,
    timestamp: String,
    user_id: String,
    user_name: String,
    activity: String,
    details: String,
}

fn read_activity_row(row: &Row<'_>) -> rusqlite::Result<ActivityRow> {
    Ok(ActivityRow {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        user_id: row.get(2)?,
        user_name: row.get(3)?,
        activity: row.get(4)?,
        details: row.get(5)?,
    })
}

impl TryFrom<ActivityRow> for ActivityEntry {
    type Error = DatabaseError;

    fn try_from(row: ActivityRow) -> Result<Self, DatabaseError> {
        Ok(ActivityEntry {
            id: row.id,
            timestamp: parse_datetime(&row.timestamp)?,
            user_id: row.user_id,
            user_name: row.user_name,
            activity: row.activity.parse()?,
            details: row.details,
        })
    }
}
