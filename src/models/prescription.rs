use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line item of a medication or medicine list.
///
/// Validated at the API boundary instead of being passed through as opaque
/// JSON. `quantity` is used by requisitions, `dosage`/`frequency` by
/// prescriptions; all three are optional so submitted items round-trip
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// A doctor-authored diagnosis-and-treatment record (a "case").
/// Append-only: never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub worker_id: Option<Uuid>,
    pub doctor_id: Uuid,
    pub diagnosis: String,
    pub medications: Vec<MedicationItem>,
    pub voice_note_url: Option<String>,
    pub hospital_name: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Prescription joined with the authoring doctor's name, as returned by a
/// worker's medical history.
#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionWithDoctor {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub doctor_name: Option<String>,
}
