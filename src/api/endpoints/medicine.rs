//! Medicine requisition endpoints: submission, government review, demand
//! aggregation.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AccountContext, ApiContext};
use crate::broadcast::Event;
use crate::db::repository::{
    insert_medicine_request, list_medicine_requests, medicine_status_counts,
    update_medicine_request_status, MedicineRequestFilter,
};
use crate::models::enums::MedicineStatus;
use crate::models::{MedicationItem, MedicineRequest, MedicineRequestWithDoctor};
use crate::stats;

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub medicines: Option<Vec<MedicationItem>>,
    pub district: Option<String>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub message: String,
    pub request: MedicineRequest,
}

/// `POST /api/medicine/request` — submit a requisition (doctor only).
/// Emits `newMedicineRequest`.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AccountContext>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let medicines = req
        .medicines
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Medicines list is required".into()))?;

    let request = MedicineRequest {
        id: Uuid::new_v4(),
        doctor_id: auth.account.id,
        hospital_name: auth
            .account
            .hospital_name
            .clone()
            .or_else(|| Some("Unknown Hospital".into())),
        district: Some(req.district.unwrap_or_else(|| "Unknown".into())),
        medicines,
        status: MedicineStatus::Pending,
        created_at: Utc::now(),
    };

    let conn = ctx.app.open_db()?;
    insert_medicine_request(&conn, &request)?;

    ctx.app.hub.broadcast(Event::NewMedicineRequest {
        id: request.id,
        hospital_name: request.hospital_name.clone(),
        district: request.district.clone(),
        medicines: request.medicines.clone(),
        status: request.status.as_str().into(),
        created_at: request.created_at,
    });

    tracing::info!(request = %request.id, district = ?request.district, "medicine request submitted");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "Medicine request submitted successfully".into(),
            request,
        }),
    ))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub district: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub requests: Vec<MedicineRequestWithDoctor>,
    pub stats: HashMap<String, i64>,
}

/// `GET /api/medicine/requests?status=&district=&limit=&offset=`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(MedicineStatus::from_str)
        .transpose()?;

    let filter = MedicineRequestFilter {
        status,
        district: query.district,
        limit: query.limit.unwrap_or(50),
        offset: query.offset.unwrap_or(0),
    };

    let conn = ctx.app.open_db()?;
    let requests = list_medicine_requests(&conn, &filter)?;
    let stats = medicine_status_counts(&conn)?;

    Ok(Json(ListResponse { requests, stats }))
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct StatusUpdateResponse {
    pub message: String,
    pub request: MedicineRequest,
}

/// `PATCH /api/medicine/request/:id` — set the status (government only).
/// Any enum value is reachable from any other; emits `medicineRequestUpdate`.
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<StatusUpdateResponse>, ApiError> {
    let status = req
        .status
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Invalid status".into()))
        .and_then(|s| {
            MedicineStatus::from_str(s).map_err(|_| ApiError::BadRequest("Invalid status".into()))
        })?;

    let conn = ctx.app.open_db()?;
    let request = update_medicine_request_status(&conn, &id, status)?
        .ok_or_else(|| ApiError::NotFound("Request not found".into()))?;

    ctx.app.hub.broadcast(Event::MedicineRequestUpdate {
        id: request.id,
        status: request.status.as_str().into(),
        updated_at: Utc::now(),
    });

    tracing::info!(request = %request.id, status = status.as_str(), "medicine request updated");

    Ok(Json(StatusUpdateResponse {
        message: "Request updated successfully".into(),
        request,
    }))
}

#[derive(Serialize)]
pub struct DemandResponse {
    pub demand: Vec<stats::DistrictDemand>,
}

/// `GET /api/medicine/demand` — per-district demand summary
/// (government only).
pub async fn demand(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
) -> Result<Json<DemandResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    Ok(Json(DemandResponse {
        demand: stats::medicine_demand(&conn)?,
    }))
}
