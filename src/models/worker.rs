use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A migrant worker registered in the system.
///
/// The one-time-code columns are transient authentication state and live
/// only in the storage layer ([`crate::db::repository::worker`]); they are
/// never part of this struct and never serialized to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    pub unique_id: String,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub origin_state: Option<String>,
    pub phone: Option<String>,
    pub current_district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}
