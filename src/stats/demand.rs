use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::models::MedicationItem;

/// Aggregated medicine demand for one district: open request count plus a
/// per-medicine cumulative quantity map.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictDemand {
    pub district: String,
    pub total_requests: i64,
    pub medicines: BTreeMap<String, i64>,
}

/// District demand over requests still in flight (pending or approved).
/// A line item without a quantity counts as 1.
pub fn medicine_demand(conn: &Connection) -> Result<Vec<DistrictDemand>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT district, medicines FROM medicine_requests
         WHERE status IN ('pending', 'approved')",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<String>>(0)?,
            row.get::<_, String>(1)?,
        ))
    })?;

    let mut by_district: BTreeMap<String, DistrictDemand> = BTreeMap::new();
    for row in rows {
        let (district, medicines_json) = row?;
        let district = district.unwrap_or_else(|| "Unknown".to_string());
        let items: Vec<MedicationItem> = serde_json::from_str(&medicines_json)?;

        let entry = by_district
            .entry(district.clone())
            .or_insert_with(|| DistrictDemand {
                district,
                total_requests: 0,
                medicines: BTreeMap::new(),
            });
        entry.total_requests += 1;
        for item in items {
            *entry.medicines.entry(item.name).or_insert(0) += item.quantity.unwrap_or(1);
        }
    }

    Ok(by_district.into_values().collect())
}
