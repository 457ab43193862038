//! Worker registry endpoints: registration, lookup, medical history,
//! district listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AccountContext, ApiContext};
use crate::db::repository::{
    get_worker_by_unique_id, get_worker_history, insert_worker, list_workers,
};
use crate::models::{PrescriptionWithDoctor, Worker};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkerRequest {
    pub unique_id: String,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub origin_state: Option<String>,
    pub phone: Option<String>,
    pub current_district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize)]
pub struct WorkerResponse {
    pub worker: Worker,
}

/// `POST /api/workers` — register a worker (doctor only).
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Json(req): Json<CreateWorkerRequest>,
) -> Result<(StatusCode, Json<WorkerResponse>), ApiError> {
    if req.unique_id.is_empty() || req.name.is_empty() {
        return Err(ApiError::BadRequest(
            "Unique ID and name are required".into(),
        ));
    }

    let worker = Worker {
        id: Uuid::new_v4(),
        unique_id: req.unique_id,
        name: req.name,
        age: req.age,
        gender: req.gender,
        origin_state: req.origin_state,
        phone: req.phone,
        current_district: req.current_district,
        latitude: req.latitude,
        longitude: req.longitude,
        created_at: Utc::now(),
    };

    let conn = ctx.app.open_db()?;
    insert_worker(&conn, &worker).map_err(|e| {
        if e.is_constraint_violation() {
            ApiError::Conflict("Worker with this ID already exists".into())
        } else {
            ApiError::from(e)
        }
    })?;

    tracing::info!(unique_id = %worker.unique_id, "worker registered");
    Ok((StatusCode::CREATED, Json(WorkerResponse { worker })))
}

/// `GET /api/workers/:unique_id`
pub async fn fetch(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Path(unique_id): Path<String>,
) -> Result<Json<WorkerResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    let worker = get_worker_by_unique_id(&conn, &unique_id)?
        .ok_or_else(|| ApiError::NotFound("Worker not found".into()))?;

    Ok(Json(WorkerResponse { worker }))
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub worker: Worker,
    pub history: Vec<PrescriptionWithDoctor>,
}

/// `GET /api/workers/:unique_id/history` — prescriptions with doctor names,
/// newest first.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Path(unique_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    let worker = get_worker_by_unique_id(&conn, &unique_id)?
        .ok_or_else(|| ApiError::NotFound("Worker not found".into()))?;
    let history = get_worker_history(&conn, &worker.id)?;

    Ok(Json(HistoryResponse { worker, history }))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub district: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct WorkersResponse {
    pub workers: Vec<Worker>,
}

/// `GET /api/workers?district=&limit=&offset=`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<WorkersResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    let workers = list_workers(
        &conn,
        query.district.as_deref(),
        query.limit.unwrap_or(50),
        query.offset.unwrap_or(0),
    )?;

    Ok(Json(WorkersResponse { workers }))
}
