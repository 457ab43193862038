//! Health camp endpoints. Creation is government-only and also persists the
//! derived broadcast notification; listing and detail are public so worker
//! clients can browse without a token.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AccountContext, ApiContext};
use crate::broadcast::Event;
use crate::db::repository::{get_camp, insert_camp_with_notification, list_camps, CampFilter};
use crate::models::enums::{CampStatus, CampType, NotificationKind};
use crate::models::{HealthCamp, Notification};

#[derive(Deserialize)]
pub struct CreateCampRequest {
    pub camp_name: Option<String>,
    pub camp_type: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub maps_link: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct CreateCampResponse {
    pub message: String,
    pub camp: HealthCamp,
}

/// `POST /api/health-camps` — create a camp (government only).
///
/// Persists the camp and its broadcast notification in one transaction,
/// then emits `newHealthCamp`. Unlocatable camps (no link, incomplete
/// coordinates) are accepted; their notification simply has no
/// navigation line.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AccountContext>,
    Json(req): Json<CreateCampRequest>,
) -> Result<(StatusCode, Json<CreateCampResponse>), ApiError> {
    let camp_name = req.camp_name.filter(|v| !v.is_empty());
    let camp_type = req.camp_type.filter(|v| !v.is_empty());
    let location_name = req.location_name.filter(|v| !v.is_empty());
    let (camp_name, camp_type, location_name, scheduled_date) =
        match (camp_name, camp_type, location_name, req.scheduled_date) {
            (Some(n), Some(t), Some(l), Some(d)) => (n, t, l, d),
            _ => {
                return Err(ApiError::BadRequest(
                    "Missing required fields: camp_name, camp_type, location_name, scheduled_date"
                        .into(),
                ))
            }
        };

    let camp_type = CampType::from_str(&camp_type).map_err(|_| {
        let allowed = CampType::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::BadRequest(format!("Invalid camp_type. Must be one of: {allowed}"))
    })?;

    let camp = HealthCamp {
        id: Uuid::new_v4(),
        camp_name,
        camp_type,
        location_name,
        latitude: req.latitude,
        longitude: req.longitude,
        maps_link: req.maps_link,
        scheduled_date,
        description: req.description,
        created_by: auth.account.id,
        status: CampStatus::Scheduled,
        created_at: Utc::now(),
    };
    let notification = camp_notification(&camp);

    let mut conn = ctx.app.open_db()?;
    insert_camp_with_notification(&mut conn, &camp, &notification)?;

    ctx.app.hub.broadcast(Event::NewHealthCamp {
        id: camp.id,
        camp_name: camp.camp_name.clone(),
        camp_type: camp.camp_type.as_str().into(),
        location_name: camp.location_name.clone(),
        latitude: camp.latitude,
        longitude: camp.longitude,
        scheduled_date: camp.scheduled_date,
    });

    tracing::info!(camp = %camp.id, camp_type = camp.camp_type.as_str(), "health camp created");

    Ok((
        StatusCode::CREATED,
        Json(CreateCampResponse {
            message: "Health camp created successfully".into(),
            camp,
        }),
    ))
}

/// Derive the human-readable broadcast notification for a camp.
fn camp_notification(camp: &HealthCamp) -> Notification {
    let formatted_date = camp.scheduled_date.format("%A, %e %B %Y, %H:%M");
    let mut message = format!(
        "{} at {} on {}.",
        camp.camp_type.as_str(),
        camp.location_name,
        formatted_date
    );
    if let Some(description) = &camp.description {
        message.push(' ');
        message.push_str(description);
    }
    if let Some(link) = camp.navigation_link() {
        message.push_str(&format!("\n\nNavigate to location: {link}"));
    }

    Notification {
        id: Uuid::new_v4(),
        title: format!("New Health Camp: {}", camp.camp_name),
        message,
        kind: NotificationKind::HealthCamp,
        reference_id: Some(camp.id),
        is_broadcast: true,
        created_at: Utc::now(),
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub camp_type: Option<String>,
    pub upcoming: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub camps: Vec<HealthCamp>,
    pub total: usize,
    pub camp_types: Vec<&'static str>,
}

/// `GET /api/health-camps?status=&camp_type=&upcoming=` — public listing.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let filter = CampFilter {
        status: query
            .status
            .as_deref()
            .map(CampStatus::from_str)
            .transpose()?,
        camp_type: query
            .camp_type
            .as_deref()
            .map(CampType::from_str)
            .transpose()?,
        upcoming_only: query.upcoming.as_deref() == Some("true"),
    };

    let conn = ctx.app.open_db()?;
    let camps = list_camps(&conn, &filter)?;
    let total = camps.len();

    Ok(Json(ListResponse {
        camps,
        total,
        camp_types: camp_type_names(),
    }))
}

#[derive(Serialize)]
pub struct DetailResponse {
    pub camp: HealthCamp,
}

/// `GET /api/health-camps/:id` — public detail.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>, ApiError> {
    let conn = ctx.app.open_db()?;
    let camp =
        get_camp(&conn, &id)?.ok_or_else(|| ApiError::NotFound("Health camp not found".into()))?;
    Ok(Json(DetailResponse { camp }))
}

#[derive(Serialize)]
pub struct TypesResponse {
    pub camp_types: Vec<&'static str>,
}

/// `GET /api/health-camps/meta/types`
pub async fn types() -> Json<TypesResponse> {
    Json(TypesResponse {
        camp_types: camp_type_names(),
    })
}

fn camp_type_names() -> Vec<&'static str> {
    CampType::ALL.iter().map(|t| t.as_str()).collect()
}
