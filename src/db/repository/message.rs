use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::Message;

use super::{parse_datetime, DATETIME_FORMAT};

pub fn insert_message(conn: &Connection, msg: &Message) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO messages (id, appointment_id, sender_id, sender_name, body, sent_at, is_ai)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            msg.id,
            msg.appointment_id,
            msg.sender_id,
            msg.sender_name,
            msg.body,
            msg.sent_at.format(DATETIME_FORMAT).to_string(),
            msg.is_ai,
        ],
    )?;
    Ok(())
}

pub fn messages_for_appointment(
    conn: &Connection,
    appointment_id: &str,
) -> Result<Vec<Message>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, sender_id, sender_name, body, sent_at, is_ai
         FROM messages WHERE appointment_id = ?1 ORDER BY sent_at ASC",
    )?;
    let rows = stmt.query_map(params![appointment_id], read_message_row)?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(row?.try_into()?);
    }
    Ok(messages)
}

/// Removes every message the user authored, across all appointments.
pub fn delete_messages_from_sender(
    conn: &Connection,
    sender_id: &str,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM messages WHERE sender_id = ?1",
        params![sender_id],
    )?;
    Ok(deleted)
}

struct MessageRow {
    id: String,
    appointment_id: String,
    sender_id: String,
    sender_name: String,
    body: String,
    sent_at: String,
    is_ai: bool,
}

fn read_message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        sender_id: row.get(2)?,
        sender_name: row.get(3)?,
        body: row.get(4)?,
        sent_at: row.get(5)?,
        is_ai: row.get(6)?,
    })
}

impl TryFrom<MessageRow> for Message {
    type Error = DatabaseError;

    fn try_from(row: MessageRow) -> Result<Self, DatabaseError> {
        Ok(Message {
            id: row.id,
            appointment_id: row.appointment_id,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            body: row.body,
            sent_at: parse_datetime(&row.sent_at)?,
            is_ai: row.is_ai,
        })
    }
}
