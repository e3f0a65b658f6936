//! Slot generation — the bookable view of a doctor's working day.
//!
//! One slot per whole hour in `[start, end)`. A slot is held by any
//! appointment at that (doctor, date, time) that was not rejected, so a
//! pending request already blocks double-booking. Weekday filtering is the
//! booking caller's job (`Doctor::is_available_on`); the generator itself is
//! date-agnostic with respect to the weekly calendar.

use chrono::{NaiveDate, NaiveTime, Timelike};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::repository::{appointments_for_doctor_on, get_doctor};
use crate::db::DatabaseError;
use crate::models::{Appointment, Doctor};

/// Derived per query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "crate::models::hhmm")]
    pub time: NaiveTime,
    pub available: bool,
}

/// Pure slot computation over the doctor's shift and the current appointment
/// set. Empty when the shift is inverted or zero-length.
pub fn generate_slots(
    doctor: &Doctor,
    date: NaiveDate,
    appointments: &[Appointment],
) -> Vec<TimeSlot> {
    let start = doctor.start_time.hour();
    let end = doctor.end_time.hour();

    (start..end)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .map(|time| {
            let booked = appointments.iter().any(|a| {
                a.doctor_id == doctor.user.id
                    && a.date == date
                    && a.time == time
                    && a.status.holds_slot()
            });
            TimeSlot {
                time,
                available: !booked,
            }
        })
        .collect()
}

/// Loads the doctor and that day's bookings, then delegates to
/// [`generate_slots`]. An unknown doctor yields no slots.
pub fn available_slots(
    conn: &Connection,
    doctor_id: &str,
    date: NaiveDate,
) -> Result<Vec<TimeSlot>, DatabaseError> {
    let Some(doctor) = get_doctor(conn, doctor_id)? else {
        return Ok(Vec::new());
    };

    let appointments = appointments_for_doctor_on(conn, doctor_id, date)?;
    Ok(generate_slots(&doctor, date, &appointments))
}
