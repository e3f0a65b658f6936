//! Revenue and growth counters for the admin overview.
//!
//! Only completed appointments earn revenue; a completed visit is worth its
//! fee snapshot plus any accumulated tip. `now` is injected so the window
//! math stays deterministic under test.

use chrono::{Duration, NaiveDateTime};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::repository::DATETIME_FORMAT;
use crate::db::DatabaseError;

#[derive(Debug, Clone, Serialize)]
pub struct UserCounts {
    pub total: i64,
    pub today: i64,
    pub week: i64,
    pub month: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueTotals {
    pub total: f64,
    pub today: f64,
    pub week: f64,
    pub month: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformAnalytics {
    pub users: UserCounts,
    pub finance: RevenueTotals,
}

/// A doctor's lifetime earnings: fee + tip over completed visits.
pub fn doctor_revenue(conn: &Connection, doctor_id: &str) -> Result<f64, DatabaseError> {
    let total = conn.query_row(
        "SELECT COALESCE(SUM(fee + tip_amount), 0)
         FROM appointments WHERE doctor_id = ?1 AND status = 'completed'",
        params![doctor_id],
        |row| row.get(0),
    )?;
    Ok(total)
}

pub fn platform_analytics(
    conn: &Connection,
    now: NaiveDateTime,
) -> Result<PlatformAnalytics, DatabaseError> {
    let users = UserCounts {
        total: count_users_since(conn, None)?,
        today: count_users_since(conn, Some(now - Duration::days(1)))?,
        week: count_users_since(conn, Some(now - Duration::days(7)))?,
        month: count_users_since(conn, Some(now - Duration::days(30)))?,
    };

    let finance = RevenueTotals {
        total: revenue_since(conn, None)?,
        today: revenue_since(conn, Some(now - Duration::days(1)))?,
        week: revenue_since(conn, Some(now - Duration::days(7)))?,
        month: revenue_since(conn, Some(now - Duration::days(30)))?,
    };

    Ok(PlatformAnalytics { users, finance })
}

fn count_users_since(
    conn: &Connection,
    cutoff: Option<NaiveDateTime>,
) -> Result<i64, DatabaseError> {
    let count = match cutoff {
        None => conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?,
        Some(cutoff) => conn.query_row(
            "SELECT COUNT(*) FROM users WHERE joined_at >= ?1",
            params![cutoff.format(DATETIME_FORMAT).to_string()],
            |row| row.get(0),
        )?,
    };
    Ok(count)
}

fn revenue_since(conn: &Connection, cutoff: Option<NaiveDateTime>) -> Result<f64, DatabaseError> {
    let total = match cutoff {
        None => conn.query_row(
            "SELECT COALESCE(SUM(fee + tip_amount), 0)
             FROM appointments WHERE status = 'completed'",
            [],
            |row| row.get(0),
        )?,
        Some(cutoff) => conn.query_row(
            "SELECT COALESCE(SUM(fee + tip_amount), 0)
             FROM appointments WHERE status = 'completed' AND date >= ?1",
            params![cutoff.date().to_string()],
            |row| row.get(0),
        )?,
    };
    Ok(total)
}
