use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::enums::{AppointmentKind, AppointmentStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub date: NaiveDate,
    #[serde(with = "super::hhmm")]
    pub time: NaiveTime,
    pub reason: String,
    pub status: AppointmentStatus,
    pub kind: AppointmentKind,
    /// Consultation price captured at booking time; later changes to the
    /// doctor's rate never touch this.
    pub fee: f64,
    pub ai_summary: Option<String>,
    pub prescription: Option<String>,
    pub is_reviewed: bool,
    pub tip_amount: f64,
}
