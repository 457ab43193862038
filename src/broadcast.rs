//! Best-effort broadcast fan-out for mutation events.
//!
//! Connected dashboard clients subscribe over the WebSocket route and may
//! join named groups (role names). Delivery is at-most-once with no
//! ordering across clients, no acknowledgment, no persistence of missed
//! events, and no replay on reconnect — dashboards compensate by polling
//! the aggregation endpoints. A full or closed subscriber channel drops the
//! frame for that subscriber only.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::{EmergencyRequest, MedicationItem};

/// Per-subscriber channel capacity. A dashboard that stops draining its
/// socket loses frames rather than backpressuring mutations.
const SUBSCRIBER_CHANNEL_CAPACITY: usize = 64;

/// Server → client event frames. Names and payload field casing match the
/// contract the dashboards consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Event {
    /// A case was submitted. Minimal public fields only.
    #[serde(rename_all = "camelCase")]
    NewCase {
        id: Uuid,
        diagnosis: String,
        district: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        hospital_name: Option<String>,
        created_at: chrono::DateTime<chrono::Utc>,
    },
    /// An emergency was raised. Full row, addressed to the
    /// `government` and `doctor` groups.
    NewEmergency(EmergencyRequest),
    /// An emergency status changed. Full updated row.
    EmergencyUpdated(EmergencyRequest),
    /// A health camp was created.
    NewHealthCamp {
        id: Uuid,
        camp_name: String,
        camp_type: String,
        location_name: String,
        latitude: Option<f64>,
        longitude: Option<f64>,
        scheduled_date: chrono::DateTime<chrono::Utc>,
    },
    /// A medicine requisition was submitted.
    #[serde(rename_all = "camelCase")]
    NewMedicineRequest {
        id: Uuid,
        hospital_name: Option<String>,
        district: Option<String>,
        medicines: Vec<MedicationItem>,
        status: String,
        created_at: chrono::DateTime<chrono::Utc>,
    },
    /// A medicine requisition status changed.
    #[serde(rename_all = "camelCase")]
    MedicineRequestUpdate {
        id: Uuid,
        status: String,
        updated_at: chrono::DateTime<chrono::Utc>,
    },
}

/// Client → server frames: a group-join message carrying a role name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinRoom(String),
}

struct Subscriber {
    tx: mpsc::Sender<Event>,
    groups: HashSet<String>,
}

/// Fan-out hub. Lives inside `AppState`; constructed explicitly so tests
/// can observe it directly. The mutex is never held across an await — all
/// sends are `try_send`.
#[derive(Default)]
pub struct BroadcastHub {
    subscribers: Mutex<HashMap<Uuid, Subscriber>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Returns its id and the receiving end the
    /// WebSocket task forwards from.
    pub fn subscribe(&self) -> (Uuid, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        let id = Uuid::new_v4();
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.insert(
            id,
            Subscriber {
                tx,
                groups: HashSet::new(),
            },
        );
        (id, rx)
    }

    /// Join a named group. Unknown subscriber ids are ignored.
    pub fn join(&self, id: Uuid, group: &str) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sub) = subscribers.get_mut(&id) {
            sub.groups.insert(group.to_string());
        }
    }

    /// Remove a subscriber on disconnect.
    pub fn unsubscribe(&self, id: Uuid) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.remove(&id);
    }

    /// Send an event to every connected subscriber.
    pub fn broadcast(&self, event: Event) {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        for sub in subscribers.values() {
            let _ = sub.tx.try_send(event.clone());
        }
    }

    /// Send an event to subscribers that joined the named group.
    pub fn to_group(&self, group: &str, event: Event) {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        for sub in subscribers.values() {
            if sub.groups.contains(group) {
                let _ = sub.tx.try_send(event.clone());
            }
        }
    }

    pub fn connected_count(&self) -> usize {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.len()
    }
}
