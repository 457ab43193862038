use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{CampStatus, CampType};
use crate::models::{HealthCamp, Notification};

use super::notification::insert_notification;
use super::parse_uuid;

const COLUMNS: &str = "id, camp_name, camp_type, location_name, latitude, longitude, maps_link, \
                       scheduled_date, description, created_by, status, created_at";

/// Listing filters for the public camp list.
#[derive(Debug, Default)]
pub struct CampFilter {
    pub status: Option<CampStatus>,
    pub camp_type: Option<CampType>,
    pub upcoming_only: bool,
}

/// Persist a camp together with its derived broadcast notification in one
/// transaction, so a crash cannot leave a camp without its notification.
pub fn insert_camp_with_notification(
    conn: &mut Connection,
    camp: &HealthCamp,
    notification: &Notification,
) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    insert_camp(&tx, camp)?;
    insert_notification(&tx, notification)?;
    tx.commit()?;
    Ok(())
}

pub fn insert_camp(conn: &Connection, camp: &HealthCamp) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO health_camps (id, camp_name, camp_type, location_name, latitude, longitude,
         maps_link, scheduled_date, description, created_by, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            camp.id.to_string(),
            camp.camp_name,
            camp.camp_type.as_str(),
            camp.location_name,
            camp.latitude,
            camp.longitude,
            camp.maps_link,
            camp.scheduled_date,
            camp.description,
            camp.created_by.to_string(),
            camp.status.as_str(),
            camp.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_camp(conn: &Connection, id: &Uuid) -> Result<Option<HealthCamp>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM health_camps WHERE id = ?1"),
            params![id.to_string()],
            camp_from_row,
        )
        .optional()?;
    row.map(finish).transpose()
}

/// Camps ordered by scheduled date ascending.
pub fn list_camps(
    conn: &Connection,
    filter: &CampFilter,
) -> Result<Vec<HealthCamp>, DatabaseError> {
    let mut sql = format!("SELECT {COLUMNS} FROM health_camps WHERE 1=1");
    let mut values: Vec<Value> = Vec::new();

    if let Some(status) = filter.status {
        sql.push_str(" AND status = ?");
        values.push(Value::from(status.as_str().to_string()));
    }
    if let Some(camp_type) = filter.camp_type {
        sql.push_str(" AND camp_type = ?");
        values.push(Value::from(camp_type.as_str().to_string()));
    }
    if filter.upcoming_only {
        sql.push_str(" AND datetime(scheduled_date) >= datetime(?)");
        values.push(Value::from(Utc::now().to_rfc3339()));
    }
    sql.push_str(" ORDER BY scheduled_date ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), camp_from_row)?;

    let mut camps = Vec::new();
    for row in rows {
        camps.push(finish(row?)?);
    }
    Ok(camps)
}

struct CampRow {
    id: String,
    camp_name: String,
    camp_type: String,
    location_name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    maps_link: Option<String>,
    scheduled_date: DateTime<Utc>,
    description: Option<String>,
    created_by: String,
    status: String,
    created_at: DateTime<Utc>,
}

fn camp_from_row(row: &Row) -> rusqlite::Result<CampRow> {
    Ok(CampRow {
        id: row.get(0)?,
        camp_name: row.get(1)?,
        camp_type: row.get(2)?,
        location_name: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        maps_link: row.get(6)?,
        scheduled_date: row.get(7)?,
        description: row.get(8)?,
        created_by: row.get(9)?,
        status: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn finish(row: CampRow) -> Result<HealthCamp, DatabaseError> {
    Ok(HealthCamp {
        id: parse_uuid(&row.id),
        camp_name: row.camp_name,
        camp_type: CampType::from_str(&row.camp_type)?,
        location_name: row.location_name,
        latitude: row.latitude,
        longitude: row.longitude,
        maps_link: row.maps_link,
        scheduled_date: row.scheduled_date,
        description: row.description,
        created_by: parse_uuid(&row.created_by),
        status: CampStatus::from_str(&row.status)?,
        created_at: row.created_at,
    })
}
