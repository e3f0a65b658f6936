//! User directory — registration, profile updates, and cascading deletion.
//!
//! Input invariants live here, at the boundary: the slot generator trusts
//! that a stored doctor carries a well-formed shift.

use chrono::{Local, NaiveTime, Weekday};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::activity;
use crate::db::repository::{
    delete_appointments_involving, delete_messages_from_sender, delete_user_row, get_user,
    insert_doctor, insert_user, set_account_status as set_status_row, update_doctor as
    update_doctor_row, update_user as update_user_row,
};
use crate::db::DatabaseError;
use crate::models::enums::{AccountStatus, ActivityType, UserRole};
use crate::models::{Doctor, User};

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("shift end {} must be after start {}", .end.format("%H:%M"), .start.format("%H:%M"))]
    InvalidShift { start: NaiveTime, end: NaiveTime },

    #[error("fee must not be negative, got {0}")]
    NegativeFee(f64),

    #[error("user {0} is an administrator and cannot be deleted")]
    ProtectedUser(String),
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub hospital: String,
    pub fees: f64,
    pub experience: u32,
    pub about: Option<String>,
    pub available_days: Vec<Weekday>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
}

/// Creates a doctor profile. New doctors start verified with a clean 5.0
/// rating and no reviews.
pub fn create_doctor(conn: &Connection, req: &NewDoctor) -> Result<Doctor, DirectoryError> {
    for (field, value) in [
        ("name", &req.name),
        ("email", &req.email),
        ("specialization", &req.specialization),
        ("hospital", &req.hospital),
    ] {
        if value.trim().is_empty() {
            return Err(DirectoryError::MissingField(field));
        }
    }
    if req.end_time <= req.start_time {
        return Err(DirectoryError::InvalidShift {
            start: req.start_time,
            end: req.end_time,
        });
    }
    if req.fees < 0.0 {
        return Err(DirectoryError::NegativeFee(req.fees));
    }

    let doctor = Doctor {
        user: User {
            id: format!("doc-{}", Uuid::new_v4()),
            name: req.name.clone(),
            email: req.email.clone(),
            role: UserRole::Doctor,
            account_status: AccountStatus::Active,
            joined_at: Local::now().naive_local(),
            last_login_at: None,
            age: None,
            gender: None,
            blood_group: None,
        },
        specialization: req.specialization.clone(),
        hospital: req.hospital.clone(),
        fees: req.fees,
        experience: req.experience,
        about: req.about.clone(),
        verified: true,
        rating: 5.0,
        reviews: 0,
        available_days: req.available_days.clone(),
        start_time: req.start_time,
        end_time: req.end_time,
    };

    insert_doctor(conn, &doctor)?;
    tracing::info!(doctor = %doctor.user.id, "doctor created");
    activity::record(
        conn,
        "admin",
        "Admin",
        ActivityType::Register,
        &format!("Created new doctor: {}", doctor.user.name),
    );

    Ok(doctor)
}

pub fn register_patient(conn: &Connection, req: &NewPatient) -> Result<User, DirectoryError> {
    if req.name.trim().is_empty() {
        return Err(DirectoryError::MissingField("name"));
    }
    if req.email.trim().is_empty() {
        return Err(DirectoryError::MissingField("email"));
    }

    let user = User {
        id: format!("pat-{}", Uuid::new_v4()),
        name: req.name.clone(),
        email: req.email.clone(),
        role: UserRole::Patient,
        account_status: AccountStatus::Active,
        joined_at: Local::now().naive_local(),
        last_login_at: None,
        age: req.age,
        gender: req.gender.clone(),
        blood_group: req.blood_group.clone(),
    };

    insert_user(conn, &user)?;
    activity::record(
        conn,
        &user.id,
        &user.name,
        ActivityType::Register,
        "New patient registration",
    );

    Ok(user)
}

/// Replaces a user's editable profile fields. Unknown id is an error, as is
/// stealing another account's email.
pub fn update_profile(conn: &Connection, user: &User) -> Result<(), DirectoryError> {
    update_user_row(conn, user)?;
    activity::record(
        conn,
        "admin",
        "System",
        ActivityType::StatusChange,
        &format!("Updated profile/status for: {}", user.name),
    );
    Ok(())
}

/// Doctor variant of [`update_profile`]; the rating aggregate is not
/// editable this way.
pub fn update_doctor_profile(conn: &Connection, doctor: &Doctor) -> Result<(), DirectoryError> {
    if doctor.end_time <= doctor.start_time {
        return Err(DirectoryError::InvalidShift {
            start: doctor.start_time,
            end: doctor.end_time,
        });
    }

    update_doctor_row(conn, doctor)?;
    activity::record(
        conn,
        &doctor.user.id,
        &doctor.user.name,
        ActivityType::DoctorUpdate,
        &format!("Updated practice profile for Dr. {}", doctor.user.name),
    );
    Ok(())
}

pub fn set_account_status(
    conn: &Connection,
    id: &str,
    status: AccountStatus,
) -> Result<(), DirectoryError> {
    set_status_row(conn, id, status)?;
    activity::record(
        conn,
        "admin",
        "Admin",
        ActivityType::StatusChange,
        &format!("Account {id} set to {}", status.as_str()),
    );
    Ok(())
}

/// Permanently removes a user together with every appointment they take part
/// in (either side) and every message they authored. Administrators are
/// protected.
pub fn delete_user(conn: &Connection, id: &str) -> Result<(), DirectoryError> {
    let user = get_user(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "User".into(),
        id: id.into(),
    })?;

    if user.role == UserRole::Admin {
        return Err(DirectoryError::ProtectedUser(user.name));
    }

    let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;
    let messages = delete_messages_from_sender(&tx, id)?;
    let appointments = delete_appointments_involving(&tx, id)?;
    delete_user_row(&tx, id)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(user = %id, appointments, messages, "user deleted with cascade");
    activity::record(
        conn,
        "admin",
        "Admin",
        ActivityType::StatusChange,
        &format!("Permanently deleted user: {}", user.name),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rusqlite::Connection;

    use crate::booking::{create_appointment, NewAppointment};
    use crate::db::repository::{
        all_appointments, get_doctor, insert_message, insert_user, messages_for_appointment,
    };
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::AppointmentKind;
    use crate::models::Message;

    fn sample_doctor_request() -> NewDoctor {
        NewDoctor {
            name: "Dr. Sarah Demo".into(),
            email: "sarah@docspot.com".into(),
            specialization: "Cardiologist".into(),
            hospital: "DocSpot Heart Center".into(),
            fees: 150.0,
            experience: 12,
            about: Some("Senior cardiologist.".into()),
            available_days: vec![Weekday::Mon, Weekday::Tue],
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }
    }

    fn sample_patient_request() -> NewPatient {
        NewPatient {
            name: "John Demo".into(),
            email: "john@example.com".into(),
            age: Some(32),
            gender: Some("Male".into()),
            blood_group: Some("O+".into()),
        }
    }

    #[test]
    fn create_doctor_initializes_aggregate() {
        let conn = open_memory_database().unwrap();
        let doctor = create_doctor(&conn, &sample_doctor_request()).unwrap();

        assert!(doctor.user.id.starts_with("doc-"));
        assert_eq!(doctor.rating, 5.0);
        assert_eq!(doctor.reviews, 0);
        assert!(doctor.verified);

        let stored = get_doctor(&conn, &doctor.user.id).unwrap().unwrap();
        assert_eq!(stored.fees, 150.0);
    }

    #[test]
    fn inverted_shift_is_rejected() {
        let conn = open_memory_database().unwrap();
        let mut req = sample_doctor_request();
        req.start_time = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        req.end_time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        let err = create_doctor(&conn, &req).unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidShift { .. }));
    }

    #[test]
    fn zero_length_shift_is_rejected() {
        let conn = open_memory_database().unwrap();
        let mut req = sample_doctor_request();
        req.end_time = req.start_time;

        let err = create_doctor(&conn, &req).unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidShift { .. }));
    }

    #[test]
    fn empty_day_set_is_allowed() {
        let conn = open_memory_database().unwrap();
        let mut req = sample_doctor_request();
        req.available_days = Vec::new();

        let doctor = create_doctor(&conn, &req).unwrap();
        let stored = get_doctor(&conn, &doctor.user.id).unwrap().unwrap();
        assert!(stored.available_days.is_empty());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = open_memory_database().unwrap();
        create_doctor(&conn, &sample_doctor_request()).unwrap();

        let mut patient = sample_patient_request();
        patient.email = "sarah@docspot.com".into();
        let err = register_patient(&conn, &patient).unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::Database(DatabaseError::EmailTaken(_))
        ));
    }

    #[test]
    fn register_patient_defaults() {
        let conn = open_memory_database().unwrap();
        let user = register_patient(&conn, &sample_patient_request()).unwrap();

        assert!(user.id.starts_with("pat-"));
        assert_eq!(user.role, UserRole::Patient);
        assert_eq!(user.account_status, AccountStatus::Active);
    }

    #[test]
    fn update_profile_unknown_user_errors() {
        let conn = open_memory_database().unwrap();
        let mut user = register_patient(&conn, &sample_patient_request()).unwrap();
        user.id = "pat-ghost".into();

        let err = update_profile(&conn, &user).unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::Database(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn update_doctor_profile_validates_shift() {
        let conn = open_memory_database().unwrap();
        let mut doctor = create_doctor(&conn, &sample_doctor_request()).unwrap();
        doctor.end_time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();

        let err = update_doctor_profile(&conn, &doctor).unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidShift { .. }));
    }

    #[test]
    fn disable_and_reenable_account() {
        let conn = open_memory_database().unwrap();
        let user = register_patient(&conn, &sample_patient_request()).unwrap();

        set_account_status(&conn, &user.id, AccountStatus::Disabled).unwrap();
        let stored = crate::db::repository::get_user(&conn, &user.id).unwrap().unwrap();
        assert_eq!(stored.account_status, AccountStatus::Disabled);

        set_account_status(&conn, &user.id, AccountStatus::Active).unwrap();
        let stored = crate::db::repository::get_user(&conn, &user.id).unwrap().unwrap();
        assert_eq!(stored.account_status, AccountStatus::Active);
    }

    fn seed_booked_world(conn: &Connection) -> (User, Doctor, String) {
        let patient = register_patient(conn, &sample_patient_request()).unwrap();
        let doctor = create_doctor(conn, &sample_doctor_request()).unwrap();

        let apt = create_appointment(
            conn,
            &NewAppointment {
                patient_id: patient.id.clone(),
                patient_name: patient.name.clone(),
                doctor_id: doctor.user.id.clone(),
                doctor_name: doctor.user.name.clone(),
                date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
                time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                reason: "Checkup".into(),
                kind: AppointmentKind::Online,
                ai_summary: None,
            },
        )
        .unwrap();

        for (id, sender, name) in [
            ("msg-1", patient.id.as_str(), patient.name.as_str()),
            ("msg-2", doctor.user.id.as_str(), doctor.user.name.as_str()),
        ] {
            insert_message(
                conn,
                &Message {
                    id: id.into(),
                    appointment_id: apt.id.clone(),
                    sender_id: sender.into(),
                    sender_name: name.into(),
                    body: "hello".into(),
                    sent_at: NaiveDate::from_ymd_opt(2026, 8, 10)
                        .unwrap()
                        .and_hms_opt(10, 5, 0)
                        .unwrap(),
                    is_ai: false,
                },
            )
            .unwrap();
        }

        (patient, doctor, apt.id)
    }

    #[test]
    fn delete_patient_cascades_appointments_and_messages() {
        let conn = open_memory_database().unwrap();
        let (patient, _doctor, apt_id) = seed_booked_world(&conn);

        delete_user(&conn, &patient.id).unwrap();

        assert!(crate::db::repository::get_user(&conn, &patient.id).unwrap().is_none());
        assert!(all_appointments(&conn).unwrap().is_empty());

        // The doctor's message survives; the patient's is gone
        let left = messages_for_appointment(&conn, &apt_id).unwrap();
        assert_eq!(left.len(), 1);
        assert_ne!(left[0].sender_id, patient.id);
    }

    #[test]
    fn delete_doctor_cascades_their_appointments() {
        let conn = open_memory_database().unwrap();
        let (_patient, doctor, _apt_id) = seed_booked_world(&conn);

        delete_user(&conn, &doctor.user.id).unwrap();

        assert!(get_doctor(&conn, &doctor.user.id).unwrap().is_none());
        assert!(all_appointments(&conn).unwrap().is_empty());
    }

    #[test]
    fn delete_preserves_unrelated_records() {
        let conn = open_memory_database().unwrap();
        let (patient, doctor, _apt_id) = seed_booked_world(&conn);

        let other = register_patient(
            &conn,
            &NewPatient {
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                age: None,
                gender: None,
                blood_group: None,
            },
        )
        .unwrap();
        let other_apt = create_appointment(
            &conn,
            &NewAppointment {
                patient_id: other.id.clone(),
                patient_name: other.name.clone(),
                doctor_id: doctor.user.id.clone(),
                doctor_name: doctor.user.name.clone(),
                date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
                time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                reason: "Follow-up".into(),
                kind: AppointmentKind::Online,
                ai_summary: None,
            },
        )
        .unwrap();

        delete_user(&conn, &patient.id).unwrap();

        let remaining = all_appointments(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, other_apt.id);
    }

    #[test]
    fn admin_cannot_be_deleted() {
        let conn = open_memory_database().unwrap();
        let admin = User {
            id: "admin-1".into(),
            name: "Alex (System Owner)".into(),
            email: "alex@docspot.com".into(),
            role: UserRole::Admin,
            account_status: AccountStatus::Active,
            joined_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            last_login_at: None,
            age: None,
            gender: None,
            blood_group: None,
        };
        insert_user(&conn, &admin).unwrap();

        let err = delete_user(&conn, "admin-1").unwrap_err();
        assert!(matches!(err, DirectoryError::ProtectedUser(_)));
        assert!(crate::db::repository::get_user(&conn, "admin-1").unwrap().is_some());
    }

    #[test]
    fn delete_unknown_user_errors() {
        let conn = open_memory_database().unwrap();
        let err = delete_user(&conn, "pat-ghost").unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::Database(DatabaseError::NotFound { .. })
        ));
    }
}
