//! Appointment lifecycle — creation, status transitions, tips, reviews.
//!
//! The transition diagram is enforced: pending → accepted/rejected,
//! accepted → in_progress/rejected, in_progress → completed; rejected and
//! completed are terminal. The slot-collision invariant (one live booking per
//! doctor/date/time) is backed by a partial unique index, so two callers
//! racing for the same slot cannot both commit.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::activity;
use crate::db::repository::{
    get_appointment, get_doctor, increment_tip, insert_appointment, mark_reviewed,
    set_prescription, set_status, update_doctor_rating,
};
use crate::db::DatabaseError;
use crate::models::enums::{ActivityType, AppointmentKind, AppointmentStatus};
use crate::models::Appointment;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("slot {time} on {date} is already booked for doctor {doctor_id}")]
    SlotTaken {
        doctor_id: String,
        date: NaiveDate,
        time: NaiveTime,
    },

    #[error("invalid status transition: {} -> {}", .from.as_str(), .to.as_str())]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("appointment {0} has already been reviewed")]
    AlreadyReviewed(String),

    #[error("tip amount must be positive, got {0}")]
    NonPositiveTip(f64),

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("prescriptions can only be issued on completed appointments, {} is {}", .id, .status.as_str())]
    PrescriptionBeforeCompletion {
        id: String,
        status: AppointmentStatus,
    },

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Booking request. The caller is expected to have checked slot availability
/// (and the doctor's weekday set) first; the unique index is the backstop.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub kind: AppointmentKind,
    pub ai_summary: Option<String>,
}

/// Creates a pending appointment, snapshotting the doctor's current fee.
pub fn create_appointment(
    conn: &Connection,
    req: &NewAppointment,
) -> Result<Appointment, BookingError> {
    for (field, value) in [
        ("patient_id", &req.patient_id),
        ("patient_name", &req.patient_name),
        ("doctor_id", &req.doctor_id),
        ("doctor_name", &req.doctor_name),
        ("reason", &req.reason),
    ] {
        if value.trim().is_empty() {
            return Err(BookingError::MissingField(field));
        }
    }

    let doctor = get_doctor(conn, &req.doctor_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Doctor".into(),
        id: req.doctor_id.clone(),
    })?;

    let apt = Appointment {
        id: format!("apt-{}", Uuid::new_v4()),
        patient_id: req.patient_id.clone(),
        patient_name: req.patient_name.clone(),
        doctor_id: req.doctor_id.clone(),
        doctor_name: req.doctor_name.clone(),
        date: req.date,
        time: req.time,
        reason: req.reason.clone(),
        status: AppointmentStatus::Pending,
        kind: req.kind,
        fee: doctor.fees,
        ai_summary: req.ai_summary.clone(),
        prescription: None,
        is_reviewed: false,
        tip_amount: 0.0,
    };

    insert_appointment(conn, &apt).map_err(|e| match e {
        DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(ref err, Some(ref msg)))
            if err.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains("uq_appointments_slot") =>
        {
            BookingError::SlotTaken {
                doctor_id: req.doctor_id.clone(),
                date: req.date,
                time: req.time,
            }
        }
        other => other.into(),
    })?;

    tracing::info!(appointment = %apt.id, doctor = %apt.doctor_id, "appointment created");
    activity::record(
        conn,
        &apt.patient_id,
        &apt.patient_name,
        ActivityType::Booking,
        &format!("Booked appointment with Dr. {}", apt.doctor_name),
    );

    Ok(apt)
}

/// Moves an appointment to `next`. Returns `false` when the id does not
/// resolve (a no-op, not an error); an illegal move is an error.
pub fn update_status(
    conn: &Connection,
    id: &str,
    next: AppointmentStatus,
) -> Result<bool, BookingError> {
    let Some(apt) = get_appointment(conn, id)? else {
        return Ok(false);
    };

    if !apt.status.can_transition_to(next) {
        return Err(BookingError::InvalidTransition {
            from: apt.status,
            to: next,
        });
    }

    set_status(conn, id, next)?;
    activity::record(
        conn,
        "system",
        "System",
        ActivityType::StatusChange,
        &format!(
            "Appointment {id} changed from {} to {}",
            apt.status.as_str(),
            next.as_str()
        ),
    );

    Ok(true)
}

/// Cancels a live appointment, freeing its slot and recording the reason.
pub fn cancel_appointment(
    conn: &Connection,
    id: &str,
    reason: &str,
) -> Result<bool, BookingError> {
    let Some(apt) = get_appointment(conn, id)? else {
        return Ok(false);
    };

    if !apt.status.can_transition_to(AppointmentStatus::Rejected) {
        return Err(BookingError::InvalidTransition {
            from: apt.status,
            to: AppointmentStatus::Rejected,
        });
    }

    set_status(conn, id, AppointmentStatus::Rejected)?;
    activity::record(
        conn,
        &apt.patient_id,
        "System",
        ActivityType::StatusChange,
        &format!("Appointment {id} cancelled. Reason: {reason}"),
    );

    Ok(true)
}

/// Adds a tip on top of the fee snapshot. Permitted in any status; the
/// amount only ever grows.
pub fn add_tip(conn: &Connection, id: &str, amount: f64) -> Result<bool, BookingError> {
    if amount <= 0.0 {
        return Err(BookingError::NonPositiveTip(amount));
    }

    let Some(apt) = get_appointment(conn, id)? else {
        return Ok(false);
    };

    increment_tip(conn, id, amount)?;
    activity::record(
        conn,
        &apt.patient_id,
        &apt.patient_name,
        ActivityType::Finance,
        &format!("Tipped Dr. {} ${amount}", apt.doctor_name),
    );

    Ok(true)
}

/// Records a review exactly once and folds the rating into the doctor's
/// running average, rounded to one decimal. Returns `false` when the
/// appointment id does not resolve.
pub fn add_review(conn: &Connection, appointment_id: &str, rating: u8) -> Result<bool, BookingError> {
    if !(1..=5).contains(&rating) {
        return Err(BookingError::RatingOutOfRange(rating));
    }

    let Some(apt) = get_appointment(conn, appointment_id)? else {
        return Ok(false);
    };

    let doctor = get_doctor(conn, &apt.doctor_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Doctor".into(),
        id: apt.doctor_id.clone(),
    })?;

    // The reviewed flag and the aggregate must move together: the
    // check-and-set is what stops a double submission from double-counting.
    let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;
    if mark_reviewed(&tx, appointment_id)? == 0 {
        return Err(BookingError::AlreadyReviewed(appointment_id.into()));
    }

    let total = doctor.rating * f64::from(doctor.reviews) + f64::from(rating);
    let count = doctor.reviews + 1;
    let new_rating = (total / f64::from(count) * 10.0).round() / 10.0;
    update_doctor_rating(&tx, &doctor.user.id, new_rating, count)?;
    tx.commit().map_err(DatabaseError::from)?;

    activity::record(
        conn,
        &apt.patient_id,
        &apt.patient_name,
        ActivityType::Review,
        &format!("Rated Dr. {} {rating} stars", apt.doctor_name),
    );

    Ok(true)
}

/// Attaches a prescription; only a completed visit can carry one.
pub fn issue_prescription(conn: &Connection, id: &str, text: &str) -> Result<(), BookingError> {
    let apt = get_appointment(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Appointment".into(),
        id: id.into(),
    })?;

    if apt.status != AppointmentStatus::Completed {
        return Err(BookingError::PrescriptionBeforeCompletion {
            id: id.into(),
            status: apt.status,
        });
    }

    set_prescription(conn, id, text)?;
    activity::record(
        conn,
        &apt.doctor_id,
        &apt.doctor_name,
        ActivityType::DoctorUpdate,
        &format!("Prescription issued for appointment {id}"),
    );

    Ok(())
}
