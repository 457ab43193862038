use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::EmergencyStatus;

/// A worker-raised emergency assistance request. No assignment or
/// ownership field; `status` is the only mutable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRequest {
    pub id: Uuid,
    pub worker_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: EmergencyStatus,
    pub created_at: DateTime<Utc>,
}

/// Emergency request joined with the raising worker's identity,
/// as returned by the government/doctor listing.
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyWithWorker {
    #[serde(flatten)]
    pub emergency: EmergencyRequest,
    pub worker_name: Option<String>,
    pub worker_phone: Option<String>,
    pub worker_unique_id: Option<String>,
}
