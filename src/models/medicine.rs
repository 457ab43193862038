use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MedicineStatus;
use super::prescription::MedicationItem;

/// A hospital's requisition for medicine stock, reviewed by the government
/// operator. `status` is the only mutable field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineRequest {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub hospital_name: Option<String>,
    pub district: Option<String>,
    pub medicines: Vec<MedicationItem>,
    pub status: MedicineStatus,
    pub created_at: DateTime<Utc>,
}

/// Medicine request joined with the requesting doctor's identity,
/// as returned by the government listing.
#[derive(Debug, Clone, Serialize)]
pub struct MedicineRequestWithDoctor {
    #[serde(flatten)]
    pub request: MedicineRequest,
    pub doctor_name: Option<String>,
    pub doctor_email: Option<String>,
}
