use chrono::Weekday;
use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::enums::AccountStatus;
use crate::models::{Doctor, User};

use super::{parse_datetime, parse_time, DATETIME_FORMAT};

const USER_COLUMNS: &str =
    "id, name, email, role, account_status, joined_at, last_login_at, age, gender, blood_group";

const DOCTOR_COLUMNS: &str = "id, name, email, role, account_status, joined_at, last_login_at, \
     age, gender, blood_group, specialization, hospital, fees, experience, about, verified, \
     rating, reviews, available_days, start_time, end_time";

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    ensure_email_free(conn, &user.email, None)?;
    conn.execute(
        "INSERT INTO users (id, name, email, role, account_status, joined_at, last_login_at,
                            age, gender, blood_group)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            user.id,
            user.name,
            user.email,
            user.role.as_str(),
            user.account_status.as_str(),
            user.joined_at.format(DATETIME_FORMAT).to_string(),
            user.last_login_at.map(|t| t.format(DATETIME_FORMAT).to_string()),
            user.age,
            user.gender,
            user.blood_group,
        ],
    )?;
    Ok(())
}

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    ensure_email_free(conn, &doctor.user.email, None)?;
    conn.execute(
        "INSERT INTO users (id, name, email, role, account_status, joined_at, last_login_at,
                            age, gender, blood_group, specialization, hospital, fees, experience,
                            about, verified, rating, reviews, available_days, start_time, end_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                 ?18, ?19, ?20, ?21)",
        params![
            doctor.user.id,
            doctor.user.name,
            doctor.user.email,
            doctor.user.role.as_str(),
            doctor.user.account_status.as_str(),
            doctor.user.joined_at.format(DATETIME_FORMAT).to_string(),
            doctor
                .user
                .last_login_at
                .map(|t| t.format(DATETIME_FORMAT).to_string()),
            doctor.user.age,
            doctor.user.gender,
            doctor.user.blood_group,
            doctor.specialization,
            doctor.hospital,
            doctor.fees,
            doctor.experience,
            doctor.about,
            doctor.verified,
            doctor.rating,
            doctor.reviews,
            days_to_csv(&doctor.available_days),
            doctor.start_time.format("%H:%M").to_string(),
            doctor.end_time.format("%H:%M").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> Result<Option<User>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        read_user_row,
    );

    match result {
        Ok(row) => Ok(Some(row.try_into()?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
        params![email],
        read_user_row,
    );

    match result {
        Ok(row) => Ok(Some(row.try_into()?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY name"))?;
    let rows = stmt.query_map([], read_user_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row?.try_into()?);
    }
    Ok(users)
}

pub fn get_doctor(conn: &Connection, id: &str) -> Result<Option<Doctor>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {DOCTOR_COLUMNS} FROM users WHERE id = ?1 AND role = 'doctor'"),
        params![id],
        read_doctor_row,
    );

    match result {
        Ok(row) => Ok(Some(row.try_into()?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM users WHERE role = 'doctor' ORDER BY name"
    ))?;
    let rows = stmt.query_map([], read_doctor_row)?;

    let mut doctors = Vec::new();
    for row in rows {
        doctors.push(row?.try_into()?);
    }
    Ok(doctors)
}

pub fn update_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    ensure_email_free(conn, &user.email, Some(&user.id))?;
    let changed = conn.execute(
        "UPDATE users SET name = ?2, email = ?3, account_status = ?4, last_login_at = ?5,
                          age = ?6, gender = ?7, blood_group = ?8
         WHERE id = ?1",
        params![
            user.id,
            user.name,
            user.email,
            user.account_status.as_str(),
            user.last_login_at.map(|t| t.format(DATETIME_FORMAT).to_string()),
            user.age,
            user.gender,
            user.blood_group,
        ],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: user.id.clone(),
        });
    }
    Ok(())
}

pub fn update_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    ensure_email_free(conn, &doctor.user.email, Some(&doctor.user.id))?;
    let changed = conn.execute(
        "UPDATE users SET name = ?2, email = ?3, account_status = ?4, specialization = ?5,
                          hospital = ?6, fees = ?7, experience = ?8, about = ?9, verified = ?10,
                          available_days = ?11, start_time = ?12, end_time = ?13
         WHERE id = ?1 AND role = 'doctor'",
        params![
            doctor.user.id,
            doctor.user.name,
            doctor.user.email,
            doctor.user.account_status.as_str(),
            doctor.specialization,
            doctor.hospital,
            doctor.fees,
            doctor.experience,
            doctor.about,
            doctor.verified,
            days_to_csv(&doctor.available_days),
            doctor.start_time.format("%H:%M").to_string(),
            doctor.end_time.format("%H:%M").to_string(),
        ],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: doctor.user.id.clone(),
        });
    }
    Ok(())
}

/// Rating and review count are owned by the review flow; everything else
/// goes through `update_doctor`.
pub fn update_doctor_rating(
    conn: &Connection,
    id: &str,
    rating: f64,
    reviews: u32,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET rating = ?2, reviews = ?3 WHERE id = ?1 AND role = 'doctor'",
        params![id, rating, reviews],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.into(),
        });
    }
    Ok(())
}

pub fn set_account_status(
    conn: &Connection,
    id: &str,
    status: AccountStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET account_status = ?2 WHERE id = ?1",
        params![id, status.as_str()],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.into(),
        });
    }
    Ok(())
}

pub fn delete_user_row(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.into(),
        });
    }
    Ok(())
}

fn ensure_email_free(
    conn: &Connection,
    email: &str,
    exclude_id: Option<&str>,
) -> Result<(), DatabaseError> {
    let result = conn.query_row(
        "SELECT id FROM users WHERE email = ?1",
        params![email],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(id) if Some(id.as_str()) != exclude_id => Err(DatabaseError::EmailTaken(email.into())),
        Ok(_) => Ok(()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ─── Row mapping ──────────────────────────────────────────────────────────────

struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    account_status: String,
    joined_at: String,
    last_login_at: Option<String>,
    age: Option<u32>,
    gender: Option<String>,
    blood_group: Option<String>,
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        account_status: row.get(4)?,
        joined_at: row.get(5)?,
        last_login_at: row.get(6)?,
        age: row.get(7)?,
        gender: row.get(8)?,
        blood_group: row.get(9)?,
    })
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, DatabaseError> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
            account_status: row.account_status.parse()?,
            joined_at: parse_datetime(&row.joined_at)?,
            last_login_at: row.last_login_at.as_deref().map(parse_datetime).transpose()?,
            age: row.age,
            gender: row.gender,
            blood_group: row.blood_group,
        })
    }
}

struct DoctorRow {
    user: UserRow,
    specialization: Option<String>,
    hospital: Option<String>,
    fees: Option<f64>,
    experience: Option<u32>,
    about: Option<String>,
    verified: Option<bool>,
    rating: Option<f64>,
    reviews: Option<u32>,
    available_days: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
}

fn read_doctor_row(row: &Row<'_>) -> rusqlite::Result<DoctorRow> {
    Ok(DoctorRow {
        user: read_user_row(row)?,
        specialization: row.get(10)?,
        hospital: row.get(11)?,
        fees: row.get(12)?,
        experience: row.get(13)?,
        about: row.get(14)?,
        verified: row.get(15)?,
        rating: row.get(16)?,
        reviews: row.get(17)?,
        available_days: row.get(18)?,
        start_time: row.get(19)?,
        end_time: row.get(20)?,
    })
}

impl TryFrom<DoctorRow> for Doctor {
    type Error = DatabaseError;

    fn try_from(row: DoctorRow) -> Result<Self, DatabaseError> {
        let doctor_id = row.user.id.clone();
        let missing = move |field: &str| {
            DatabaseError::ConstraintViolation(format!("doctor row {doctor_id} is missing {field}"))
        };

        Ok(Doctor {
            specialization: row.specialization.ok_or_else(|| missing("specialization"))?,
            hospital: row.hospital.ok_or_else(|| missing("hospital"))?,
            fees: row.fees.ok_or_else(|| missing("fees"))?,
            experience: row.experience.unwrap_or(0),
            about: row.about,
            verified: row.verified.unwrap_or(false),
            rating: row.rating.ok_or_else(|| missing("rating"))?,
            reviews: row.reviews.ok_or_else(|| missing("reviews"))?,
            available_days: days_from_csv(row.available_days.as_deref().unwrap_or_default())?,
            start_time: parse_time(&row.start_time.ok_or_else(|| missing("start_time"))?)?,
            end_time: parse_time(&row.end_time.ok_or_else(|| missing("end_time"))?)?,
            user: row.user.try_into()?,
        })
    }
}

fn days_to_csv(days: &[Weekday]) -> String {
    days.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn days_from_csv(raw: &str) -> Result<Vec<Weekday>, DatabaseError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<Weekday>()
                .map_err(|_| DatabaseError::InvalidEnum {
                    field: "available_days".into(),
                    value: s.into(),
                })
        })
        .collect()
}
