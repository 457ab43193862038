//! Bearer token authentication middleware.
//!
//! Two token surfaces share one session store: account tokens (doctor or
//! government role) and worker tokens. Presenting a token of the wrong kind
//! is a 403, not a 401 — the token is valid, the surface is not.

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{AccountContext, ApiContext, WorkerContext};
use crate::auth::Principal;
use crate::models::enums::Role;

/// Require a valid account (doctor/government) bearer token.
/// On success injects [`AccountContext`] for downstream handlers.
pub async fn require_account(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_account_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_account_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = context(&req)?;
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Access token required".into()))?;

    match ctx.app.resolve_token(&token) {
        Some(Principal::Account(account)) => {
            req.extensions_mut().insert(AccountContext { account });
            Ok(next.run(req).await)
        }
        Some(Principal::Worker(_)) => Err(ApiError::Forbidden("Invalid token type".into())),
        None => Err(ApiError::Unauthorized("Invalid or expired token".into())),
    }
}

/// Require a valid worker bearer token.
/// On success injects [`WorkerContext`] for downstream handlers.
pub async fn require_worker(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_worker_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_worker_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = context(&req)?;
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Access token required".into()))?;

    match ctx.app.resolve_token(&token) {
        Some(Principal::Worker(worker)) => {
            req.extensions_mut().insert(WorkerContext { worker });
            Ok(next.run(req).await)
        }
        Some(Principal::Account(_)) => Err(ApiError::Forbidden("Invalid token type".into())),
        None => Err(ApiError::Unauthorized("Invalid or expired token".into())),
    }
}

/// Refine an authenticated account to the doctor role.
/// Layered after [`require_account`].
pub async fn require_doctor(req: Request<axum::body::Body>, next: Next) -> Response {
    require_role(req, next, Role::Doctor).await
}

/// Refine an authenticated account to the government role.
/// Layered after [`require_account`].
pub async fn require_government(req: Request<axum::body::Body>, next: Next) -> Response {
    require_role(req, next, Role::Government).await
}

async fn require_role(req: Request<axum::body::Body>, next: Next, role: Role) -> Response {
    let authorized = req
        .extensions()
        .get::<AccountContext>()
        .map(|ctx| ctx.account.role == role)
        .unwrap_or(false);

    if authorized {
        next.run(req).await
    } else {
        ApiError::Forbidden("Access denied. Insufficient permissions.".into()).into_response()
    }
}

fn context(req: &Request<axum::body::Body>) -> Result<ApiContext, ApiError> {
    req.extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("missing API context".into()))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}
