use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::enums::{AccountStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub account_status: AccountStatus,
    pub joined_at: NaiveDateTime,
    pub last_login_at: Option<NaiveDateTime>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
}

/// A doctor is a user plus the practice profile the scheduler reads:
/// consultation fee, rating aggregate, and the weekly working-hours contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(flatten)]
    pub user: User,
    pub specialization: String,
    pub hospital: String,
    pub fees: f64,
    pub experience: u32,
    pub about: Option<String>,
    pub verified: bool,
    pub rating: f64,
    pub reviews: u32,
    #[serde(with = "super::weekdays")]
    pub available_days: Vec<Weekday>,
    #[serde(with = "super::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "super::hhmm")]
    pub end_time: NaiveTime,
}

impl Doctor {
    /// Weekday filtering belongs to the booking caller, not the slot
    /// generator; this is the check it uses.
    pub fn is_available_on(&self, day: Weekday) -> bool {
        self.available_days.contains(&day)
    }
}
