//! Emergency request endpoints. Workers raise requests with their own
//! token; doctors and the government operator list and resolve them.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AccountContext, ApiContext, WorkerContext};
use crate::broadcast::Event;
use crate::db::repository::{
    insert_emergency, list_emergencies, list_worker_emergencies, update_emergency_status,
};
use crate::models::enums::EmergencyStatus;
use crate::models::{EmergencyRequest, EmergencyWithWorker};

#[derive(Deserialize)]
pub struct CreateRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize)]
pub struct CreateResponse {
    pub message: String,
    pub emergency: EmergencyRequest,
}

/// `POST /api/emergency` — raise an emergency (worker token). Notifies the
/// `government` and `doctor` groups.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<WorkerContext>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let kind = req
        .kind
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Emergency type is required".into()))?;

    let emergency = EmergencyRequest {
        id: Uuid::new_v4(),
        worker_id: auth.worker.id,
        kind,
        description: req.description,
        latitude: req.latitude,
        longitude: req.longitude,
        status: EmergencyStatus::Pending,
        created_at: Utc::now(),
    };

    let conn = ctx.app.open_db()?;
    insert_emergency(&conn, &emergency)?;

    ctx.app
        .hub
        .to_group("government", Event::NewEmergency(emergency.clone()));
    ctx.app
        .hub
        .to_group("doctor", Event::NewEmergency(emergency.clone()));

    tracing::info!(emergency = %emergency.id, kind = %emergency.kind, "emergency raised");

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            message: "Emergency request created".into(),
            emergency,
        }),
    ))
}

#[derive(Serialize)]
pub struct MyRequestsResponse {
    pub emergencies: Vec<EmergencyRequest>,
}

/// `GET /api/emergency/my-requests` — the calling worker's own requests.
pub async fn my_requests(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<WorkerContext>,
) -> Result<Json<MyRequestsResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    let emergencies = list_worker_emergencies(&conn, &auth.worker.id)?;
    Ok(Json(MyRequestsResponse { emergencies }))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub emergencies: Vec<EmergencyWithWorker>,
}

/// `GET /api/emergency?status=&limit=&offset=` — account listing with
/// worker identity.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(EmergencyStatus::from_str)
        .transpose()?;

    let conn = ctx.app.open_db()?;
    let emergencies = list_emergencies(
        &conn,
        status,
        query.limit.unwrap_or(50),
        query.offset.unwrap_or(0),
    )?;
    Ok(Json(ListResponse { emergencies }))
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct StatusUpdateResponse {
    pub emergency: EmergencyRequest,
}

/// `PUT /api/emergency/:id` — set the status (any account). Any enum value
/// is reachable from any other; emits `emergencyUpdated` to all.
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<StatusUpdateResponse>, ApiError> {
    let status = req
        .status
        .as_deref()
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Valid status required: pending, in_progress, resolved, cancelled".into(),
            )
        })
        .and_then(|s| {
            EmergencyStatus::from_str(s).map_err(|_| {
                ApiError::BadRequest(
                    "Valid status required: pending, in_progress, resolved, cancelled".into(),
                )
            })
        })?;

    let conn = ctx.app.open_db()?;
    let emergency = update_emergency_status(&conn, &id, status)?
        .ok_or_else(|| ApiError::NotFound("Emergency request not found".into()))?;

    ctx.app
        .hub
        .broadcast(Event::EmergencyUpdated(emergency.clone()));

    tracing::info!(emergency = %emergency.id, status = status.as_str(), "emergency updated");

    Ok(Json(StatusUpdateResponse { emergency }))
}
