use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Prescription, PrescriptionWithDoctor};

use super::parse_uuid;

const COLUMNS: &str = "id, worker_id, doctor_id, diagnosis, medications, voice_note_url, \
                       hospital_name, district, latitude, longitude, created_at";

pub fn insert_prescription(
    conn: &Connection,
    prescription: &Prescription,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, worker_id, doctor_id, diagnosis, medications,
         voice_note_url, hospital_name, district, latitude, longitude, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            prescription.id.to_string(),
            prescription.worker_id.map(|id| id.to_string()),
            prescription.doctor_id.to_string(),
            prescription.diagnosis,
            serde_json::to_string(&prescription.medications)?,
            prescription.voice_note_url,
            prescription.hospital_name,
            prescription.district,
            prescription.latitude,
            prescription.longitude,
            prescription.created_at,
        ],
    )?;
    Ok(())
}

/// A worker's medical history: their prescriptions joined with the
/// authoring doctor's name, newest first.
pub fn get_worker_history(
    conn: &Connection,
    worker_id: &Uuid,
) -> Result<Vec<PrescriptionWithDoctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, a.name AS doctor_name
         FROM prescriptions p LEFT JOIN accounts a ON p.doctor_id = a.id
         WHERE p.worker_id = ?1
         ORDER BY p.created_at DESC",
        prefixed_columns()
    ))?;

    let rows = stmt.query_map(params![worker_id.to_string()], |row| {
        let raw = prescription_from_row(row)?;
        let doctor_name: Option<String> = row.get(11)?;
        Ok((raw, doctor_name))
    })?;

    let mut history = Vec::new();
    for row in rows {
        let (raw, doctor_name) = row?;
        history.push(PrescriptionWithDoctor {
            prescription: finish(raw)?,
            doctor_name,
        });
    }
    Ok(history)
}

fn prefixed_columns() -> String {
    COLUMNS
        .split(", ")
        .map(|c| format!("p.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

struct PrescriptionRow {
    id: String,
    worker_id: Option<String>,
    doctor_id: String,
    diagnosis: String,
    medications: String,
    voice_note_url: Option<String>,
    hospital_name: Option<String>,
    district: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
}

fn prescription_from_row(row: &Row) -> rusqlite::Result<PrescriptionRow> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        worker_id: row.get(1)?,
        doctor_id: row.get(2)?,
        diagnosis: row.get(3)?,
        medications: row.get(4)?,
        voice_note_url: row.get(5)?,
        hospital_name: row.get(6)?,
        district: row.get(7)?,
        latitude: row.get(8)?,
        longitude: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn finish(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    Ok(Prescription {
        id: parse_uuid(&row.id),
        worker_id: row.worker_id.as_deref().map(parse_uuid),
        doctor_id: parse_uuid(&row.doctor_id),
        diagnosis: row.diagnosis,
        medications: serde_json::from_str(&row.medications)?,
        voice_note_url: row.voice_note_url,
        hospital_name: row.hospital_name,
        district: row.district,
        latitude: row.latitude,
        longitude: row.longitude,
        created_at: row.created_at,
    })
}
