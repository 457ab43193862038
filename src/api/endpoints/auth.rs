//! Account authentication: login, registration, current identity.

use std::str::FromStr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AccountContext, ApiContext};
use crate::auth::{self, AccountClaims, Principal};
use crate::db::repository::{get_account, get_account_by_email, insert_account};
use crate::models::enums::Role;
use crate::models::{Account, AccountPublic};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub hospital_name: Option<String>,
    pub hospital_id: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: AccountPublic,
}

/// `POST /api/auth/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".into(),
        ));
    }

    let conn = ctx.app.open_db()?;
    let account = get_account_by_email(&conn, &req.email)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".into()))?;

    if !auth::verify_password(&req.password, &account.password_hash) {
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let token = ctx.app.issue_token(Principal::Account(claims(&account)));
    tracing::info!(email = %account.email, role = account.role.as_str(), "account logged in");

    Ok(Json(TokenResponse {
        token,
        user: AccountPublic::from(&account),
    }))
}

/// `POST /api/auth/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    if req.email.is_empty() || req.password.is_empty() || req.name.is_empty() {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    }
    let role = Role::from_str(&req.role)
        .map_err(|_| ApiError::BadRequest("Invalid role".into()))?;

    let conn = ctx.app.open_db()?;
    if get_account_by_email(&conn, &req.email)?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = auth::hash_password(&req.password);

    let account = Account {
        id: Uuid::new_v4(),
        email: req.email,
        password_hash,
        name: req.name,
        role,
        hospital_name: req.hospital_name,
        hospital_id: req.hospital_id,
        created_at: Utc::now(),
    };
    insert_account(&conn, &account)?;

    let token = ctx.app.issue_token(Principal::Account(claims(&account)));
    tracing::info!(email = %account.email, role = role.as_str(), "account registered");

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            user: AccountPublic::from(&account),
        }),
    ))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: AccountPublic,
}

/// `GET /api/auth/me`
pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AccountContext>,
) -> Result<Json<MeResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    let account = get_account(&conn, &auth.account.id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(MeResponse {
        user: AccountPublic::from(&account),
    }))
}

fn claims(account: &Account) -> AccountClaims {
    AccountClaims {
        id: account.id,
        email: account.email.clone(),
        name: account.name.clone(),
        role: account.role,
        hospital_name: account.hospital_name.clone(),
        hospital_id: account.hospital_id.clone(),
    }
}
