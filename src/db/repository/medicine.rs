use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::MedicineStatus;
use crate::models::{MedicineRequest, MedicineRequestWithDoctor};

use super::parse_uuid;

const COLUMNS: &str = "id, doctor_id, hospital_name, district, medicines, status, created_at";

/// Listing filters for the government review screen.
#[derive(Debug, Default)]
pub struct MedicineRequestFilter {
    pub status: Option<MedicineStatus>,
    pub district: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

pub fn insert_medicine_request(
    conn: &Connection,
    request: &MedicineRequest,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicine_requests (id, doctor_id, hospital_name, district, medicines, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            request.id.to_string(),
            request.doctor_id.to_string(),
            request.hospital_name,
            request.district,
            serde_json::to_string(&request.medicines)?,
            request.status.as_str(),
            request.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_medicine_request(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<MedicineRequest>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM medicine_requests WHERE id = ?1"),
            params![id.to_string()],
            request_from_row,
        )
        .optional()?;
    row.map(finish).transpose()
}

/// Set the status of a request. Returns the updated row, or `None` when the
/// id does not exist. Last write wins; there is no transition graph.
pub fn update_medicine_request_status(
    conn: &Connection,
    id: &Uuid,
    status: MedicineStatus,
) -> Result<Option<MedicineRequest>, DatabaseError> {
    let changed = conn.execute(
        "UPDATE medicine_requests SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    get_medicine_request(conn, id)
}

pub fn list_medicine_requests(
    conn: &Connection,
    filter: &MedicineRequestFilter,
) -> Result<Vec<MedicineRequestWithDoctor>, DatabaseError> {
    let mut sql = String::from(
        "SELECT mr.id, mr.doctor_id, mr.hospital_name, mr.district, mr.medicines, mr.status,
                mr.created_at, a.name AS doctor_name, a.email AS doctor_email
         FROM medicine_requests mr
         LEFT JOIN accounts a ON mr.doctor_id = a.id
         WHERE 1=1",
    );
    let mut values: Vec<Value> = Vec::new();

    if let Some(status) = filter.status {
        sql.push_str(" AND mr.status = ?");
        values.push(Value::from(status.as_str().to_string()));
    }
    if let Some(district) = &filter.district {
        sql.push_str(" AND mr.district = ?");
        values.push(Value::from(district.clone()));
    }
    sql.push_str(" ORDER BY mr.created_at DESC LIMIT ? OFFSET ?");
    values.push(Value::from(filter.limit));
    values.push(Value::from(filter.offset));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| {
        let raw = request_from_row(row)?;
        let doctor_name: Option<String> = row.get(7)?;
        let doctor_email: Option<String> = row.get(8)?;
        Ok((raw, doctor_name, doctor_email))
    })?;

    let mut requests = Vec::new();
    for row in rows {
        let (raw, doctor_name, doctor_email) = row?;
        requests.push(MedicineRequestWithDoctor {
            request: finish(raw)?,
            doctor_name,
            doctor_email,
        });
    }
    Ok(requests)
}

/// Request counts grouped by status, for the listing's summary block.
pub fn medicine_status_counts(conn: &Connection) -> Result<HashMap<String, i64>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT status, COUNT(*) FROM medicine_requests GROUP BY status")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

    let mut counts = HashMap::new();
    for row in rows {
        let (status, count) = row?;
        counts.insert(status, count);
    }
    Ok(counts)
}

struct RequestRow {
    id: String,
    doctor_id: String,
    hospital_name: Option<String>,
    district: Option<String>,
    medicines: String,
    status: String,
    created_at: DateTime<Utc>,
}

fn request_from_row(row: &Row) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        hospital_name: row.get(2)?,
        district: row.get(3)?,
        medicines: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn finish(row: RequestRow) -> Result<MedicineRequest, DatabaseError> {
    Ok(MedicineRequest {
        id: parse_uuid(&row.id),
        doctor_id: parse_uuid(&row.doctor_id),
        hospital_name: row.hospital_name,
        district: row.district,
        medicines: serde_json::from_str(&row.medicines)?,
        status: MedicineStatus::from_str(&row.status)?,
        created_at: row.created_at,
    })
}
