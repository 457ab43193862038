use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::NotificationKind;

/// A write-once notification row, read by polling clients. Push delivery
/// happens separately through the broadcast hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub reference_id: Option<Uuid>,
    pub is_broadcast: bool,
    pub created_at: DateTime<Utc>,
}
