use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::NotificationKind;
use crate::models::Notification;

use super::parse_uuid;

const COLUMNS: &str = "id, title, message, type, reference_id, is_broadcast, created_at";

pub fn insert_notification(
    conn: &Connection,
    notification: &Notification,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, title, message, type, reference_id, is_broadcast, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            notification.id.to_string(),
            notification.title,
            notification.message,
            notification.kind.as_str(),
            notification.reference_id.map(|id| id.to_string()),
            notification.is_broadcast,
            notification.created_at,
        ],
    )?;
    Ok(())
}

/// The notification derived from a camp (or other referenced entity).
pub fn get_notification_for_reference(
    conn: &Connection,
    reference_id: &Uuid,
) -> Result<Option<Notification>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM notifications WHERE reference_id = ?1"),
            params![reference_id.to_string()],
            notification_from_row,
        )
        .optional()?;
    row.map(finish).transpose()
}

/// Broadcast notifications, newest first. Polled by worker-facing clients.
pub fn list_broadcast_notifications(
    conn: &Connection,
    limit: i64,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM notifications WHERE is_broadcast = 1
         ORDER BY created_at DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], notification_from_row)?;

    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(finish(row?)?);
    }
    Ok(notifications)
}

struct NotificationRow {
    id: String,
    title: String,
    message: String,
    kind: String,
    reference_id: Option<String>,
    is_broadcast: bool,
    created_at: DateTime<Utc>,
}

fn notification_from_row(row: &Row) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        title: row.get(1)?,
        message: row.get(2)?,
        kind: row.get(3)?,
        reference_id: row.get(4)?,
        is_broadcast: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn finish(row: NotificationRow) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: parse_uuid(&row.id),
        title: row.title,
        message: row.message,
        kind: NotificationKind::from_str(&row.kind)?,
        reference_id: row.reference_id.as_deref().map(parse_uuid),
        is_broadcast: row.is_broadcast,
        created_at: row.created_at,
    })
}
