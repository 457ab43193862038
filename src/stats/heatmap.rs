use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::DatabaseError;

use super::TimeRange;

/// One merged map point: all windowed cases sharing an identical
/// (latitude, longitude) pair, with cumulative weight and the distinct
/// diagnoses observed there.
#[derive(Debug, Serialize)]
pub struct HeatmapPoint {
    pub lat: f64,
    pub lng: f64,
    pub weight: i64,
    pub district: Option<String>,
    pub diagnoses: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmap {
    pub heatmap_data: Vec<HeatmapPoint>,
    /// Number of plottable cases that contributed to the points.
    pub raw_cases: i64,
}

/// Project windowed cases onto the map. Cases without both coordinates are
/// not plottable and never contribute (no 0,0 defaulting).
pub fn case_heatmap(conn: &Connection, range: TimeRange) -> Result<Heatmap, DatabaseError> {
    let cutoff = range.cutoff(Utc::now());

    let mut stmt = conn.prepare(
        "SELECT latitude, longitude, diagnosis, district FROM prescriptions
         WHERE latitude IS NOT NULL AND longitude IS NOT NULL AND datetime(created_at) > datetime(?1)
         ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![cutoff], |row| {
        Ok((
            row.get::<_, f64>(0)?,
            row.get::<_, f64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut points: Vec<HeatmapPoint> = Vec::new();
    let mut index: HashMap<(u64, u64), usize> = HashMap::new();
    let mut raw_cases = 0i64;

    for row in rows {
        let (lat, lng, diagnosis, district) = row?;
        raw_cases += 1;

        let key = (lat.to_bits(), lng.to_bits());
        let slot = *index.entry(key).or_insert_with(|| {
            points.push(HeatmapPoint {
                lat,
                lng,
                weight: 0,
                district,
                diagnoses: Vec::new(),
            });
            points.len() - 1
        });

        let point = &mut points[slot];
        point.weight += 1;
        if !point.diagnoses.contains(&diagnosis) {
            point.diagnoses.push(diagnosis);
        }
    }

    Ok(Heatmap {
        heatmap_data: points,
        raw_cases,
    })
}
