//! Case (prescription) endpoints: submission plus the dashboard
//! aggregations.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AccountContext, ApiContext};
use crate::broadcast::Event;
use crate::db::repository::{get_worker_by_unique_id, insert_prescription};
use crate::models::{MedicationItem, Prescription};
use crate::stats::{self, TimeRange};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCaseRequest {
    pub worker_id: Option<Uuid>,
    pub worker_unique_id: Option<String>,
    pub diagnosis: Option<String>,
    pub medications: Option<Vec<MedicationItem>>,
    pub voice_note_url: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize)]
pub struct SubmitCaseResponse {
    pub message: String,
    pub prescription: Prescription,
}

/// `POST /api/cases` — submit a case (doctor only). Emits `newCase` after
/// the row is committed.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AccountContext>,
    Json(req): Json<SubmitCaseRequest>,
) -> Result<(StatusCode, Json<SubmitCaseResponse>), ApiError> {
    let diagnosis = req
        .diagnosis
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Diagnosis and medications are required".into()))?;
    let medications = req
        .medications
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Diagnosis and medications are required".into()))?;

    let conn = ctx.app.open_db()?;

    // Resolve the worker's external id when no direct reference was given.
    let worker_id = match (req.worker_id, &req.worker_unique_id) {
        (Some(id), _) => Some(id),
        (None, Some(unique_id)) => Some(
            get_worker_by_unique_id(&conn, unique_id)?
                .ok_or_else(|| ApiError::NotFound("Worker not found".into()))?
                .id,
        ),
        (None, None) => None,
    };

    let prescription = Prescription {
        id: Uuid::new_v4(),
        worker_id,
        doctor_id: auth.account.id,
        diagnosis,
        medications,
        voice_note_url: req.voice_note_url,
        hospital_name: auth
            .account
            .hospital_name
            .clone()
            .or_else(|| Some("Unknown Hospital".into())),
        district: req.district,
        latitude: req.latitude,
        longitude: req.longitude,
        created_at: Utc::now(),
    };
    insert_prescription(&conn, &prescription)?;

    // Event emission happens after the persistence commit, so a subscriber
    // reacting to it is guaranteed the row is already queryable.
    ctx.app.hub.broadcast(Event::NewCase {
        id: prescription.id,
        diagnosis: prescription.diagnosis.clone(),
        district: prescription.district.clone(),
        latitude: prescription.latitude,
        longitude: prescription.longitude,
        hospital_name: prescription.hospital_name.clone(),
        created_at: prescription.created_at,
    });

    tracing::info!(case = %prescription.id, district = ?prescription.district, "case reported");

    Ok((
        StatusCode::CREATED,
        Json(SubmitCaseResponse {
            message: "Case reported successfully".into(),
            prescription,
        }),
    ))
}

#[derive(Deserialize)]
pub struct TimeRangeQuery {
    #[serde(rename = "timeRange")]
    pub time_range: Option<String>,
}

impl TimeRangeQuery {
    fn range(&self) -> TimeRange {
        self.time_range
            .as_deref()
            .map(TimeRange::from_token)
            .unwrap_or_default()
    }
}

/// `GET /api/cases/stats?timeRange=24h|7d|30d`
pub async fn stats(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Query(query): Query<TimeRangeQuery>,
) -> Result<Json<stats::CaseStats>, ApiError> {
    let conn = ctx.app.open_db()?;
    Ok(Json(stats::case_stats(&conn, query.range())?))
}

/// `GET /api/cases/heatmap?timeRange=`
pub async fn heatmap(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
    Query(query): Query<TimeRangeQuery>,
) -> Result<Json<stats::Heatmap>, ApiError> {
    let conn = ctx.app.open_db()?;
    Ok(Json(stats::case_heatmap(&conn, query.range())?))
}

#[derive(Serialize)]
pub struct TrendsResponse {
    pub trends: Vec<stats::TrendPoint>,
}

/// `GET /api/cases/trends` — fixed 30-day lookback.
pub async fn trends(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<AccountContext>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    Ok(Json(TrendsResponse {
        trends: stats::disease_trends(&conn)?,
    }))
}
