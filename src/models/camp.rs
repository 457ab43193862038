use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{CampStatus, CampType};

/// A scheduled public-health event announced to workers.
/// Creation also persists a broadcast [`super::Notification`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCamp {
    pub id: Uuid,
    pub camp_name: String,
    pub camp_type: CampType,
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub maps_link: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub status: CampStatus,
    pub created_at: DateTime<Utc>,
}

impl HealthCamp {
    /// Navigation link for the camp: the explicit maps link when supplied,
    /// otherwise constructed from complete coordinates. `None` when the camp
    /// is unlocatable.
    pub fn navigation_link(&self) -> Option<String> {
        if let Some(link) = &self.maps_link {
            return Some(link.clone());
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(format!(
                "https://www.google.com/maps/search/?api=1&query={lat},{lon}"
            )),
            _ => None,
        }
    }
}
