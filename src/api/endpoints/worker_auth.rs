//! Worker authentication via one-time codes.
//!
//! Request: resolve the worker by phone, store a 6-digit code with a
//! 5-minute validity (overwriting any prior code). Verify: compare and
//! check expiry; success clears the code in the same statement that checks
//! it and issues a worker token. In production the code goes out via SMS;
//! here it is logged, and echoed in the response only in demo mode.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, WorkerContext};
use crate::auth::{self, Principal, WorkerClaims, OTP_VALIDITY};
use crate::db::repository::{
    clear_otp_if_matches, get_otp, get_worker, get_worker_by_phone, set_otp,
};
use crate::models::Worker;

#[derive(Deserialize)]
pub struct RequestOtpBody {
    pub phone: Option<String>,
}

#[derive(Serialize)]
pub struct RequestOtpResponse {
    pub message: String,
    /// Demo mode only; absent in production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_for_testing: Option<String>,
}

/// `POST /api/worker-auth/request-otp`
pub async fn request_otp(
    State(ctx): State<ApiContext>,
    Json(body): Json<RequestOtpBody>,
) -> Result<Json<RequestOtpResponse>, ApiError> {
    let phone = body
        .phone
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Phone number is required".into()))?;

    let conn = ctx.app.open_db()?;
    let worker = get_worker_by_phone(&conn, &phone)?
        .ok_or_else(|| ApiError::NotFound("Worker not found with this phone number".into()))?;

    let otp = auth::generate_otp();
    let expires_at = Utc::now() + OTP_VALIDITY;
    set_otp(&conn, &worker.id, &otp, expires_at)?;

    tracing::info!(phone = %phone, otp = %otp, "one-time code issued");

    Ok(Json(RequestOtpResponse {
        message: "OTP sent successfully".into(),
        otp_for_testing: ctx.app.demo_mode.then_some(otp),
    }))
}

#[derive(Deserialize)]
pub struct VerifyOtpBody {
    pub phone: Option<String>,
    pub otp: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub message: String,
    pub token: String,
    pub worker: WorkerSummary,
}

/// Worker identity in the login response (camelCase contract).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
    pub id: Uuid,
    pub unique_id: String,
    pub name: String,
    pub phone: Option<String>,
}

/// `POST /api/worker-auth/verify-otp`
pub async fn verify_otp(
    State(ctx): State<ApiContext>,
    Json(body): Json<VerifyOtpBody>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    let (phone, otp) = match (
        body.phone.filter(|p| !p.is_empty()),
        body.otp.filter(|o| !o.is_empty()),
    ) {
        (Some(phone), Some(otp)) => (phone, otp),
        _ => return Err(ApiError::BadRequest("Phone and OTP are required".into())),
    };

    let conn = ctx.app.open_db()?;
    let worker = get_worker_by_phone(&conn, &phone)?
        .ok_or_else(|| ApiError::NotFound("Worker not found".into()))?;

    let challenge = get_otp(&conn, &worker.id)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid OTP".into()))?;

    if challenge.code != otp {
        return Err(ApiError::Unauthorized("Invalid OTP".into()));
    }
    if Utc::now() > challenge.expires_at {
        return Err(ApiError::OtpExpired);
    }

    // Clearing is guarded on the code value, so a replayed or concurrent
    // verification loses the race and fails.
    if !clear_otp_if_matches(&conn, &worker.id, &otp)? {
        return Err(ApiError::Unauthorized("Invalid OTP".into()));
    }

    let token = ctx.app.issue_token(Principal::Worker(WorkerClaims {
        id: worker.id,
        unique_id: worker.unique_id.clone(),
        name: worker.name.clone(),
    }));

    tracing::info!(unique_id = %worker.unique_id, "worker logged in");

    Ok(Json(VerifyOtpResponse {
        message: "Login successful".into(),
        token,
        worker: WorkerSummary {
            id: worker.id,
            unique_id: worker.unique_id,
            name: worker.name,
            phone: worker.phone,
        },
    }))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub worker: Worker,
}

/// `GET /api/worker-auth/me`
pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<WorkerContext>,
) -> Result<Json<MeResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    let worker = get_worker(&conn, &auth.worker.id)?
        .ok_or_else(|| ApiError::NotFound("Worker not found".into()))?;
    Ok(Json(MeResponse { worker }))
}
