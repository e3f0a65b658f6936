//! Repository layer — entity-scoped database operations.
//!
//! Free functions over `&Connection`, one sub-module per entity. All public
//! functions are re-exported here.

mod activity;
mod appointment;
mod message;
mod user;

pub use activity::*;
pub use appointment::*;
pub use message::*;
pub use user::*;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::DatabaseError;

pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| DatabaseError::ConstraintViolation(format!("unparseable date: {raw}")))
}

pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, DatabaseError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| DatabaseError::ConstraintViolation(format!("unparseable time: {raw}")))
}

pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|_| DatabaseError::ConstraintViolation(format!("unparseable timestamp: {raw}")))
}
