use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::DatabaseError;

use super::TimeRange;

/// Dashboard statistics over the case table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStats {
    /// Cases inside the lookback window.
    pub total_cases: i64,
    /// Cases created on the current calendar date, irrespective of window.
    pub today_cases: i64,
    /// Distinct workers with at least one windowed case.
    pub active_workers: i64,
    /// Windowed counts per district, descending. Tie order unspecified.
    pub by_district: Vec<DistrictCount>,
    /// Windowed counts per diagnosis, descending, top 10.
    pub by_diagnosis: Vec<DiagnosisCount>,
}

#[derive(Debug, Serialize)]
pub struct DistrictCount {
    pub district: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct DiagnosisCount {
    pub diagnosis: String,
    pub count: i64,
}

pub fn case_stats(conn: &Connection, range: TimeRange) -> Result<CaseStats, DatabaseError> {
    let now = Utc::now();
    let cutoff = range.cutoff(now);

    let total_cases: i64 = conn.query_row(
        "SELECT COUNT(*) FROM prescriptions WHERE datetime(created_at) > datetime(?1)",
        params![cutoff],
        |row| row.get(0),
    )?;

    let today_cases: i64 = conn.query_row(
        "SELECT COUNT(*) FROM prescriptions WHERE date(created_at) = date(?1)",
        params![now],
        |row| row.get(0),
    )?;

    let active_workers: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT worker_id) FROM prescriptions
         WHERE worker_id IS NOT NULL AND datetime(created_at) > datetime(?1)",
        params![cutoff],
        |row| row.get(0),
    )?;

    let mut by_district = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT district, COUNT(*) AS count FROM prescriptions
             WHERE district IS NOT NULL AND datetime(created_at) > datetime(?1)
             GROUP BY district ORDER BY count DESC",
        )?;
        let rows = stmt.query_map(params![cutoff], |row| {
            Ok(DistrictCount {
                district: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        for row in rows {
            by_district.push(row?);
        }
    }

    let mut by_diagnosis = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT diagnosis, COUNT(*) AS count FROM prescriptions
             WHERE datetime(created_at) > datetime(?1)
             GROUP BY diagnosis ORDER BY count DESC LIMIT 10",
        )?;
        let rows = stmt.query_map(params![cutoff], |row| {
            Ok(DiagnosisCount {
                diagnosis: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        for row in rows {
            by_diagnosis.push(row?);
        }
    }

    Ok(CaseStats {
        total_cases,
        today_cases,
        active_workers,
        by_district,
        by_diagnosis,
    })
}
