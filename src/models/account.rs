use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Role;

/// A doctor or government-operator account.
///
/// The password hash never leaves the storage layer; API responses use
/// [`AccountPublic`].
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub hospital_name: Option<String>,
    pub hospital_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client-facing account fields (camelCase, the dashboard contract).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPublic {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub hospital_name: Option<String>,
    pub hospital_id: Option<String>,
}

impl From<&Account> for AccountPublic {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role,
            hospital_name: account.hospital_name.clone(),
            hospital_id: account.hospital_id.clone(),
        }
    }
}
