use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::Appointment;

use super::{parse_date, parse_time};

const APPOINTMENT_COLUMNS: &str = "id, patient_id, patient_name, doctor_id, doctor_name, date, \
     time, reason, status, kind, fee, ai_summary, prescription, is_reviewed, tip_amount";

pub fn insert_appointment(conn: &Connection, apt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, patient_name, doctor_id, doctor_name, date,
                                   time, reason, status, kind, fee, ai_summary, prescription,
                                   is_reviewed, tip_amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            apt.id,
            apt.patient_id,
            apt.patient_name,
            apt.doctor_id,
            apt.doctor_name,
            apt.date.to_string(),
            apt.time.format("%H:%M").to_string(),
            apt.reason,
            apt.status.as_str(),
            apt.kind.as_str(),
            apt.fee,
            apt.ai_summary,
            apt.prescription,
            apt.is_reviewed,
            apt.tip_amount,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &str) -> Result<Option<Appointment>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
        params![id],
        read_appointment_row,
    );

    match result {
        Ok(row) => Ok(Some(row.try_into()?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Number of rows changed: 0 means the id did not resolve.
pub fn set_status(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?2 WHERE id = ?1",
        params![id, status.as_str()],
    )?;
    Ok(changed)
}

/// Single-statement increment so concurrent tips cannot lose an update.
pub fn increment_tip(conn: &Connection, id: &str, delta: f64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET tip_amount = tip_amount + ?2 WHERE id = ?1",
        params![id, delta],
    )?;
    Ok(changed)
}

/// Check-and-set in one statement: 0 rows changed means the appointment was
/// already reviewed (or does not exist).
pub fn mark_reviewed(conn: &Connection, id: &str) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET is_reviewed = 1 WHERE id = ?1 AND is_reviewed = 0",
        params![id],
    )?;
    Ok(changed)
}

pub fn set_prescription(conn: &Connection, id: &str, text: &str) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET prescription = ?2 WHERE id = ?1",
        params![id, text],
    )?;
    Ok(changed)
}

pub fn appointments_for_doctor_on(
    conn: &Connection,
    doctor_id: &str,
    date: NaiveDate,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE doctor_id = ?1 AND date = ?2 ORDER BY time"
    ))?;
    let rows = stmt.query_map(params![doctor_id, date.to_string()], read_appointment_row)?;

    collect_appointments(rows)
}

pub fn appointments_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE patient_id = ?1 ORDER BY date DESC, time DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id], read_appointment_row)?;

    collect_appointments(rows)
}

pub fn appointments_for_doctor(
    conn: &Connection,
    doctor_id: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE doctor_id = ?1 ORDER BY date DESC, time DESC"
    ))?;
    let rows = stmt.query_map(params![doctor_id], read_appointment_row)?;

    collect_appointments(rows)
}

pub fn all_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY date DESC, time DESC"
    ))?;
    let rows = stmt.query_map([], read_appointment_row)?;

    collect_appointments(rows)
}

/// Removes every appointment the user participates in, either side.
pub fn delete_appointments_involving(
    conn: &Connection,
    user_id: &str,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM appointments WHERE patient_id = ?1 OR doctor_id = ?1",
        params![user_id],
    )?;
    Ok(deleted)
}

// ─── Row mapping ──────────────────────────────────────────────────────────────

struct AppointmentRow {
    id: String,
    patient_id: String,
    patient_name: String,
    doctor_id: String,
    doctor_name: String,
    date: String,
    time: String,
    reason: String,
    status: String,
    kind: String,
    fee: f64,
    ai_summary: Option<String>,
    prescription: Option<String>,
    is_reviewed: bool,
    tip_amount: f64,
}

fn read_appointment_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        patient_name: row.get(2)?,
        doctor_id: row.get(3)?,
        doctor_name: row.get(4)?,
        date: row.get(5)?,
        time: row.get(6)?,
        reason: row.get(7)?,
        status: row.get(8)?,
        kind: row.get(9)?,
        fee: row.get(10)?,
        ai_summary: row.get(11)?,
        prescription: row.get(12)?,
        is_reviewed: row.get(13)?,
        tip_amount: row.get(14)?,
    })
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DatabaseError;

    fn try_from(row: AppointmentRow) -> Result<Self, DatabaseError> {
        Ok(Appointment {
            id: row.id,
            patient_id: row.patient_id,
            patient_name: row.patient_name,
            doctor_id: row.doctor_id,
            doctor_name: row.doctor_name,
            date: parse_date(&row.date)?,
            time: parse_time(&row.time)?,
            reason: row.reason,
            status: row.status.parse()?,
            kind: row.kind.parse()?,
            fee: row.fee,
            ai_summary: row.ai_summary,
            prescription: row.prescription,
            is_reviewed: row.is_reviewed,
            tip_amount: row.tip_amount,
        })
    }
}

fn collect_appointments(
    rows: impl Iterator<Item = rusqlite::Result<AppointmentRow>>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?.try_into()?);
    }
    Ok(appointments)
}
