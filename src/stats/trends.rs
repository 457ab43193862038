use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::DatabaseError;

/// One calendar date with a count per diagnosis observed that date.
/// Diagnoses with no cases that day are absent rather than zero.
#[derive(Debug, Serialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(flatten)]
    pub counts: BTreeMap<String, i64>,
}

/// Case counts grouped by (calendar date, diagnosis) over a fixed 30-day
/// lookback, dates ascending.
pub fn disease_trends(conn: &Connection) -> Result<Vec<TrendPoint>, DatabaseError> {
    let cutoff = Utc::now() - Duration::days(30);

    let mut stmt = conn.prepare(
        "SELECT date(created_at) AS day, diagnosis, COUNT(*) AS count
         FROM prescriptions
         WHERE datetime(created_at) > datetime(?1)
         GROUP BY day, diagnosis
         ORDER BY day ASC",
    )?;
    let rows = stmt.query_map(params![cutoff], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut by_date: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for row in rows {
        let (date, diagnosis, count) = row?;
        by_date.entry(date).or_default().insert(diagnosis, count);
    }

    Ok(by_date
        .into_iter()
        .map(|(date, counts)| TrendPoint { date, counts })
        .collect())
}
