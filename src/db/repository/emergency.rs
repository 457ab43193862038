use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::EmergencyStatus;
use crate::models::{EmergencyRequest, EmergencyWithWorker};

use super::parse_uuid;

const COLUMNS: &str = "id, worker_id, type, description, latitude, longitude, status, created_at";

pub fn insert_emergency(
    conn: &Connection,
    emergency: &EmergencyRequest,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO emergency_requests (id, worker_id, type, description, latitude, longitude, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            emergency.id.to_string(),
            emergency.worker_id.to_string(),
            emergency.kind,
            emergency.description,
            emergency.latitude,
            emergency.longitude,
            emergency.status.as_str(),
            emergency.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_emergency(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<EmergencyRequest>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM emergency_requests WHERE id = ?1"),
            params![id.to_string()],
            emergency_from_row,
        )
        .optional()?;
    row.map(finish).transpose()
}

/// Set the status of an emergency. Returns the updated row, or `None` when
/// the id does not exist. Last write wins; there is no transition graph.
pub fn update_emergency_status(
    conn: &Connection,
    id: &Uuid,
    status: EmergencyStatus,
) -> Result<Option<EmergencyRequest>, DatabaseError> {
    let changed = conn.execute(
        "UPDATE emergency_requests SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    get_emergency(conn, id)
}

/// A worker's own emergency requests, newest first.
pub fn list_worker_emergencies(
    conn: &Connection,
    worker_id: &Uuid,
) -> Result<Vec<EmergencyRequest>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM emergency_requests WHERE worker_id = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![worker_id.to_string()], emergency_from_row)?;

    let mut emergencies = Vec::new();
    for row in rows {
        emergencies.push(finish(row?)?);
    }
    Ok(emergencies)
}

/// Government/doctor listing joined with worker identity.
pub fn list_emergencies(
    conn: &Connection,
    status: Option<EmergencyStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<EmergencyWithWorker>, DatabaseError> {
    let mut sql = String::from(
        "SELECT e.id, e.worker_id, e.type, e.description, e.latitude, e.longitude, e.status,
                e.created_at, w.name AS worker_name, w.phone AS worker_phone,
                w.unique_id AS worker_unique_id
         FROM emergency_requests e
         LEFT JOIN workers w ON e.worker_id = w.id",
    );
    let mut values: Vec<Value> = Vec::new();

    if let Some(status) = status {
        sql.push_str(" WHERE e.status = ?");
        values.push(Value::from(status.as_str().to_string()));
    }
    sql.push_str(" ORDER BY e.created_at DESC LIMIT ? OFFSET ?");
    values.push(Value::from(limit));
    values.push(Value::from(offset));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| {
        let raw = emergency_from_row(row)?;
        let worker_name: Option<String> = row.get(8)?;
        let worker_phone: Option<String> = row.get(9)?;
        let worker_unique_id: Option<String> = row.get(10)?;
        Ok((raw, worker_name, worker_phone, worker_unique_id))
    })?;

    let mut emergencies = Vec::new();
    for row in rows {
        let (raw, worker_name, worker_phone, worker_unique_id) = row?;
        emergencies.push(EmergencyWithWorker {
            emergency: finish(raw)?,
            worker_name,
            worker_phone,
            worker_unique_id,
        });
    }
    Ok(emergencies)
}

struct EmergencyRow {
    id: String,
    worker_id: String,
    kind: String,
    description: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    status: String,
    created_at: DateTime<Utc>,
}

fn emergency_from_row(row: &Row) -> rusqlite::Result<EmergencyRow> {
    Ok(EmergencyRow {
        id: row.get(0)?,
        worker_id: row.get(1)?,
        kind: row.get(2)?,
        description: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn finish(row: EmergencyRow) -> Result<EmergencyRequest, DatabaseError> {
    Ok(EmergencyRequest {
        id: parse_uuid(&row.id),
        worker_id: parse_uuid(&row.worker_id),
        kind: row.kind,
        description: row.description,
        latitude: row.latitude,
        longitude: row.longitude,
        status: EmergencyStatus::from_str(&row.status)?,
        created_at: row.created_at,
    })
}
