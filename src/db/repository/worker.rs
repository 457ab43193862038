use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Worker;

use super::parse_uuid;

const COLUMNS: &str = "id, unique_id, name, age, gender, origin_state, phone, \
                       current_district, latitude, longitude, created_at";

/// Pending one-time-code state for a worker. Transient: cleared by
/// [`clear_otp_if_matches`] on successful verification.
#[derive(Debug)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

pub fn insert_worker(conn: &Connection, worker: &Worker) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO workers (id, unique_id, name, age, gender, origin_state, phone,
         current_district, latitude, longitude, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            worker.id.to_string(),
            worker.unique_id,
            worker.name,
            worker.age,
            worker.gender,
            worker.origin_state,
            worker.phone,
            worker.current_district,
            worker.latitude,
            worker.longitude,
            worker.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_worker(conn: &Connection, id: &Uuid) -> Result<Option<Worker>, DatabaseError> {
    let worker = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM workers WHERE id = ?1"),
            params![id.to_string()],
            worker_from_row,
        )
        .optional()?;
    Ok(worker)
}

pub fn get_worker_by_unique_id(
    conn: &Connection,
    unique_id: &str,
) -> Result<Option<Worker>, DatabaseError> {
    let worker = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM workers WHERE unique_id = ?1"),
            params![unique_id],
            worker_from_row,
        )
        .optional()?;
    Ok(worker)
}

pub fn get_worker_by_phone(
    conn: &Connection,
    phone: &str,
) -> Result<Option<Worker>, DatabaseError> {
    let worker = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM workers WHERE phone = ?1"),
            params![phone],
            worker_from_row,
        )
        .optional()?;
    Ok(worker)
}

pub fn list_workers(
    conn: &Connection,
    district: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Worker>, DatabaseError> {
    let mut workers = Vec::new();
    match district {
        Some(district) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM workers WHERE current_district = ?1
                 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt.query_map(params![district, limit, offset], worker_from_row)?;
            for row in rows {
                workers.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM workers ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map(params![limit, offset], worker_from_row)?;
            for row in rows {
                workers.push(row?);
            }
        }
    }
    Ok(workers)
}

/// Overwrite any prior one-time code for the worker.
pub fn set_otp(
    conn: &Connection,
    worker_id: &Uuid,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE workers SET otp = ?1, otp_expires_at = ?2 WHERE id = ?3",
        params![code, expires_at, worker_id.to_string()],
    )?;
    Ok(())
}

pub fn get_otp(conn: &Connection, worker_id: &Uuid) -> Result<Option<OtpChallenge>, DatabaseError> {
    let challenge = conn
        .query_row(
            "SELECT otp, otp_expires_at FROM workers WHERE id = ?1",
            params![worker_id.to_string()],
            |row| {
                let code: Option<String> = row.get(0)?;
                let expires_at: Option<DateTime<Utc>> = row.get(1)?;
                Ok(code.zip(expires_at))
            },
        )
        .optional()?
        .flatten()
        .map(|(code, expires_at)| OtpChallenge { code, expires_at });
    Ok(challenge)
}

/// Clear the one-time code, guarded on the submitted value so clearing is
/// atomic with the authentication decision. Returns `false` when the stored
/// code no longer matches (already consumed, or overwritten concurrently).
pub fn clear_otp_if_matches(
    conn: &Connection,
    worker_id: &Uuid,
    code: &str,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE workers SET otp = NULL, otp_expires_at = NULL WHERE id = ?1 AND otp = ?2",
        params![worker_id.to_string(), code],
    )?;
    Ok(changed == 1)
}

fn worker_from_row(row: &Row) -> rusqlite::Result<Worker> {
    let id: String = row.get(0)?;
    Ok(Worker {
        id: parse_uuid(&id),
        unique_id: row.get(1)?,
        name: row.get(2)?,
        age: row.get(3)?,
        gender: row.get(4)?,
        origin_state: row.get(5)?,
        phone: row.get(6)?,
        current_district: row.get(7)?,
        latitude: row.get(8)?,
        longitude: row.get(9)?,
        created_at: row.get(10)?,
    })
}
