//! Broadcast notification polling. The push path is the WebSocket hub;
//! this is the durable side worker clients poll.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::list_broadcast_notifications;
use crate::models::Notification;

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub notifications: Vec<Notification>,
}

/// `GET /api/notifications?limit=` — broadcast notifications, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    let notifications = list_broadcast_notifications(&conn, query.limit.unwrap_or(50))?;
    Ok(Json(ListResponse { notifications }))
}
