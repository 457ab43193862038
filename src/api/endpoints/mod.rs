//! API endpoint handlers, one module per resource.

pub mod auth;
pub mod camps;
pub mod cases;
pub mod emergency;
pub mod health;
pub mod medicine;
pub mod notifications;
pub mod uploads;
pub mod worker_auth;
pub mod workers;
