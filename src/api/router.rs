//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! REST routes are nested under `/api/` in groups by token requirement:
//! public, account (with doctor/government refinements), and worker.
//! The WebSocket route lives at `/ws` and uploads are served at
//! `/uploads`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::endpoints::{self, uploads::MAX_VOICE_NOTE_BYTES};
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::api::websocket;
use crate::state::AppState;

/// Build the API router.
pub fn api_router(app: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(Any);
    build_router(ApiContext::new(app)).layer(cors)
}

/// Build the API router with CORS restricted to the configured frontend
/// origin.
pub fn api_router_with_origin(app: Arc<AppState>, origin: &str) -> Router {
    let cors = match origin.parse() {
        Ok(value) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(value))
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(origin, "invalid CORS origin, allowing any");
            CorsLayer::new()
                .allow_origin(AllowOrigin::any())
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };
    build_router(ApiContext::new(app)).layer(cors)
}

fn build_router(ctx: ApiContext) -> Router {
    // Unauthenticated routes: login surfaces, public camp directory,
    // notification polling, liveness.
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/auth/register", post(endpoints::auth::register))
        .route(
            "/worker-auth/request-otp",
            post(endpoints::worker_auth::request_otp),
        )
        .route(
            "/worker-auth/verify-otp",
            post(endpoints::worker_auth::verify_otp),
        )
        .route("/health-camps", get(endpoints::camps::list))
        .route("/health-camps/meta/types", get(endpoints::camps::types))
        .route("/health-camps/:id", get(endpoints::camps::detail))
        .route("/notifications", get(endpoints::notifications::list))
        .with_state(ctx.clone());

    // Any authenticated account (doctor or government).
    let account = Router::new()
        .route("/auth/me", get(endpoints::auth::me))
        .route("/workers", get(endpoints::workers::list))
        .route("/workers/:unique_id", get(endpoints::workers::fetch))
        .route(
            "/workers/:unique_id/history",
            get(endpoints::workers::history),
        )
        .route("/cases/stats", get(endpoints::cases::stats))
        .route("/cases/heatmap", get(endpoints::cases::heatmap))
        .route("/cases/trends", get(endpoints::cases::trends))
        .route("/medicine/requests", get(endpoints::medicine::list))
        .route("/emergency", get(endpoints::emergency::list))
        .route("/emergency/:id", put(endpoints::emergency::update_status))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(
            middleware::auth::require_account,
        ));

    // Doctor-only mutations.
    let doctor = Router::new()
        .route("/workers", post(endpoints::workers::create))
        .route("/cases", post(endpoints::cases::submit))
        .route("/medicine/request", post(endpoints::medicine::submit))
        .route("/uploads/voice-note", post(endpoints::uploads::voice_note))
        .layer(DefaultBodyLimit::max(MAX_VOICE_NOTE_BYTES + 64 * 1024))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_doctor))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_account,
        ));

    // Government-only operations.
    let government = Router::new()
        .route(
            "/medicine/request/:id",
            patch(endpoints::medicine::update_status),
        )
        .route("/medicine/demand", get(endpoints::medicine::demand))
        .route("/health-camps", post(endpoints::camps::create))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(
            middleware::auth::require_government,
        ))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_account,
        ));

    // Worker-token routes.
    let worker = Router::new()
        .route("/emergency", post(endpoints::emergency::create))
        .route(
            "/emergency/my-requests",
            get(endpoints::emergency::my_requests),
        )
        .route("/worker-auth/me", get(endpoints::worker_auth::me))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_worker));

    // Broadcast channel.
    let ws_routes = Router::new()
        .route("/ws", get(websocket::ws_upgrade))
        .with_state(ctx.clone());

    Router::new()
        .nest("/api", public)
        .nest("/api", account)
        .nest("/api", doctor)
        .nest("/api", government)
        .nest("/api", worker)
        .merge(ws_routes)
        .nest_service("/uploads", ServeDir::new(&ctx.app.uploads_dir))
        .layer(axum::middleware::from_fn(middleware::log::trace_requests))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::{AccountClaims, Principal, WorkerClaims};
    use crate::db;
    use crate::db::repository::{
        get_medicine_request, get_notification_for_reference, get_worker_by_unique_id,
        insert_medicine_request, insert_worker,
    };
    use crate::models::enums::{MedicineStatus, Role};
    use crate::models::{MedicationItem, MedicineRequest, Worker};

    fn test_state() -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("bridge.db");
        db::init_database(&db_path).unwrap();
        let state = Arc::new(AppState::new(db_path, dir.path().join("uploads"), true));
        (dir, state)
    }

    fn doctor_token(state: &AppState) -> String {
        let conn = state.open_db().unwrap();
        let account = crate::models::Account {
            id: Uuid::new_v4(),
            email: format!("{}@hospital.test", Uuid::new_v4()),
            password_hash: "x".into(),
            name: "Dr. Arun Kumar".into(),
            role: Role::Doctor,
            hospital_name: Some("General Hospital Ernakulam".into()),
            hospital_id: Some("GHE001".into()),
            created_at: Utc::now(),
        };
        crate::db::repository::insert_account(&conn, &account).unwrap();
        state.issue_token(Principal::Account(AccountClaims {
            id: account.id,
            email: account.email,
            name: account.name,
            role: Role::Doctor,
            hospital_name: account.hospital_name,
            hospital_id: account.hospital_id,
        }))
    }

    fn government_token(state: &AppState) -> String {
        let conn = state.open_db().unwrap();
        let account = crate::models::Account {
            id: Uuid::new_v4(),
            email: format!("{}@kerala.test", Uuid::new_v4()),
            password_hash: "x".into(),
            name: "Health Commissioner".into(),
            role: Role::Government,
            hospital_name: None,
            hospital_id: None,
            created_at: Utc::now(),
        };
        crate::db::repository::insert_account(&conn, &account).unwrap();
        state.issue_token(Principal::Account(AccountClaims {
            id: account.id,
            email: account.email,
            name: account.name,
            role: Role::Government,
            hospital_name: None,
            hospital_id: None,
        }))
    }

    fn worker_token(state: &AppState) -> (String, Uuid) {
        let conn = state.open_db().unwrap();
        let worker = Worker {
            id: Uuid::new_v4(),
            unique_id: format!("MHB-{}", Uuid::new_v4()),
            name: "Ramesh Kumar".into(),
            age: Some(32),
            gender: None,
            origin_state: None,
            phone: Some(format!("9{}", rand::random::<u32>())),
            current_district: Some("Ernakulam".into()),
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
        };
        insert_worker(&conn, &worker).unwrap();
        let token = state.issue_token(Principal::Worker(WorkerClaims {
            id: worker.id,
            unique_id: worker.unique_id,
            name: worker.name,
        }));
        (token, worker.id)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_check_needs_no_token() {
        let (_dir, state) = test_state();
        let app = api_router(state);

        let response = app
            .oneshot(request("GET", "/api/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn protected_route_rejects_missing_token() {
        let (_dir, state) = test_state();
        let app = api_router(state);

        let response = app
            .oneshot(request("GET", "/api/cases/stats", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn worker_token_is_rejected_on_account_surface() {
        let (_dir, state) = test_state();
        let (token, _) = worker_token(&state);
        let app = api_router(state);

        let response = app
            .oneshot(request("GET", "/api/cases/stats", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn account_token_is_rejected_on_worker_surface() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);
        let app = api_router(state);

        let response = app
            .oneshot(request(
                "GET",
                "/api/emergency/my-requests",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn government_cannot_submit_cases() {
        let (_dir, state) = test_state();
        let token = government_token(&state);
        let app = api_router(state);

        let body = r#"{"diagnosis":"Dengue Fever","medications":[{"name":"Paracetamol"}]}"#;
        let response = app
            .oneshot(request("POST", "/api/cases", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn doctor_cannot_create_camps() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);
        let app = api_router(state);

        let body = r#"{"camp_name":"X","camp_type":"Eye Camp","location_name":"Y","scheduled_date":"2031-03-01T09:00:00Z"}"#;
        let response = app
            .oneshot(request("POST", "/api/health-camps", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn case_submission_round_trips_and_lands_in_stats() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        let body = r#"{
            "diagnosis": "Dengue Fever",
            "medications": [{"name":"Paracetamol","dosage":"500mg","frequency":"TDS"}],
            "district": "Ernakulam",
            "latitude": 9.9816,
            "longitude": 76.2999
        }"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/cases", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = response_json(response).await;
        let prescription = &json["prescription"];
        assert_eq!(prescription["diagnosis"], "Dengue Fever");
        assert_eq!(prescription["district"], "Ernakulam");
        assert_eq!(prescription["latitude"], 9.9816);
        assert_eq!(prescription["longitude"], 76.2999);
        assert_eq!(prescription["medications"][0]["name"], "Paracetamol");
        assert_eq!(prescription["medications"][0]["dosage"], "500mg");
        assert_eq!(prescription["medications"][0]["frequency"], "TDS");
        assert_eq!(
            prescription["hospital_name"], "General Hospital Ernakulam",
            "hospital defaults to the doctor's"
        );

        let response = api_router(state)
            .oneshot(request(
                "GET",
                "/api/cases/stats?timeRange=24h",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stats = response_json(response).await;
        assert_eq!(stats["totalCases"], 1);
        assert_eq!(stats["todayCases"], 1);
        assert_eq!(stats["byDistrict"][0]["district"], "Ernakulam");
        assert_eq!(stats["byDiagnosis"][0]["diagnosis"], "Dengue Fever");
    }

    #[tokio::test]
    async fn case_submission_requires_diagnosis_and_medications() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        for body in [
            r#"{"medications":[{"name":"Paracetamol"}]}"#,
            r#"{"diagnosis":"Dengue Fever"}"#,
            r#"{"diagnosis":"Dengue Fever","medications":[]}"#,
        ] {
            let response = api_router(state.clone())
                .oneshot(request("POST", "/api/cases", Some(&token), Some(body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        }
    }

    #[tokio::test]
    async fn case_submission_resolves_worker_unique_id() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        let conn = state.open_db().unwrap();
        let worker = Worker {
            id: Uuid::new_v4(),
            unique_id: "MHB-2024-001".into(),
            name: "Ramesh Kumar".into(),
            age: None,
            gender: None,
            origin_state: None,
            phone: None,
            current_district: None,
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
        };
        insert_worker(&conn, &worker).unwrap();

        let body = r#"{"workerUniqueId":"MHB-2024-001","diagnosis":"Malaria","medications":[{"name":"Artemether"}]}"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/cases", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = response_json(response).await;
        assert_eq!(json["prescription"]["worker_id"], worker.id.to_string());

        // unresolved identifier fails before any write
        let body = r#"{"workerUniqueId":"MHB-0000-000","diagnosis":"Malaria","medications":[{"name":"Artemether"}]}"#;
        let response = api_router(state)
            .oneshot(request("POST", "/api/cases", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_status_is_rejected_and_row_unchanged() {
        let (_dir, state) = test_state();
        let gov = government_token(&state);

        let conn = state.open_db().unwrap();
        let doctor_id = {
            let account = crate::models::Account {
                id: Uuid::new_v4(),
                email: "d@x.test".into(),
                password_hash: "x".into(),
                name: "Dr".into(),
                role: Role::Doctor,
                hospital_name: None,
                hospital_id: None,
                created_at: Utc::now(),
            };
            crate::db::repository::insert_account(&conn, &account).unwrap();
            account.id
        };
        let req = MedicineRequest {
            id: Uuid::new_v4(),
            doctor_id,
            hospital_name: None,
            district: Some("Ernakulam".into()),
            medicines: vec![MedicationItem {
                name: "Paracetamol".into(),
                dosage: None,
                frequency: None,
                quantity: Some(500),
            }],
            status: MedicineStatus::Pending,
            created_at: Utc::now(),
        };
        insert_medicine_request(&conn, &req).unwrap();

        let response = api_router(state.clone())
            .oneshot(request(
                "PATCH",
                &format!("/api/medicine/request/{}", req.id),
                Some(&gov),
                Some(r#"{"status":"done"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let stored = get_medicine_request(&conn, &req.id).unwrap().unwrap();
        assert_eq!(stored.status, MedicineStatus::Pending, "status unchanged");

        // idempotent per value: same valid status twice, no error
        for _ in 0..2 {
            let response = api_router(state.clone())
                .oneshot(request(
                    "PATCH",
                    &format!("/api/medicine/request/{}", req.id),
                    Some(&gov),
                    Some(r#"{"status":"approved"}"#),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let stored = get_medicine_request(&conn, &req.id).unwrap().unwrap();
        assert_eq!(stored.status, MedicineStatus::Approved);
    }

    #[tokio::test]
    async fn status_update_on_missing_id_is_404() {
        let (_dir, state) = test_state();
        let gov = government_token(&state);

        let response = api_router(state)
            .oneshot(request(
                "PATCH",
                &format!("/api/medicine/request/{}", Uuid::new_v4()),
                Some(&gov),
                Some(r#"{"status":"approved"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn demand_summary_accumulates_quantities() {
        let (_dir, state) = test_state();
        let doctor = doctor_token(&state);
        let gov = government_token(&state);

        let first = r#"{"district":"Ernakulam","medicines":[{"name":"Paracetamol","quantity":500}]}"#;
        let second = r#"{"district":"Ernakulam","medicines":[{"name":"Paracetamol","quantity":200},{"name":"Artemether","quantity":100}]}"#;
        for body in [first, second] {
            let response = api_router(state.clone())
                .oneshot(request(
                    "POST",
                    "/api/medicine/request",
                    Some(&doctor),
                    Some(body),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = api_router(state)
            .oneshot(request("GET", "/api/medicine/demand", Some(&gov), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let demand = json["demand"]
            .as_array()
            .unwrap()
            .iter()
            .find(|d| d["district"] == "Ernakulam")
            .expect("Ernakulam demand present");
        assert_eq!(demand["totalRequests"], 2);
        assert_eq!(demand["medicines"]["Paracetamol"], 700);
        assert_eq!(demand["medicines"]["Artemether"], 100);
    }

    #[tokio::test]
    async fn demand_is_government_only() {
        let (_dir, state) = test_state();
        let doctor = doctor_token(&state);

        let response = api_router(state)
            .oneshot(request("GET", "/api/medicine/demand", Some(&doctor), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn duplicate_worker_unique_id_conflicts() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        let body = r#"{"uniqueId":"MHB-2024-001","name":"Ramesh Kumar"}"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/workers", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = api_router(state)
            .oneshot(request("POST", "/api/workers", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn camp_creation_persists_notification_and_validates_type() {
        let (_dir, state) = test_state();
        let gov = government_token(&state);

        let bad = r#"{"camp_name":"X","camp_type":"Yoga Retreat","location_name":"Y","scheduled_date":"2031-03-01T09:00:00Z"}"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/health-camps", Some(&gov), Some(bad)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let good = r#"{
            "camp_name": "Monsoon Dengue Screening",
            "camp_type": "Dengue Checkup",
            "location_name": "Community Hall, Kochi",
            "latitude": 9.9312,
            "longitude": 76.2673,
            "scheduled_date": "2031-03-01T09:00:00Z",
            "description": "Free screening for all workers"
        }"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/health-camps", Some(&gov), Some(good)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = response_json(response).await;
        let camp_id: Uuid = json["camp"]["id"].as_str().unwrap().parse().unwrap();
        assert_eq!(json["camp"]["status"], "scheduled");

        let conn = state.open_db().unwrap();
        let notification = get_notification_for_reference(&conn, &camp_id)
            .unwrap()
            .expect("notification persisted with camp");
        assert!(notification.message.contains("Dengue Checkup"));
        assert!(notification
            .message
            .contains("https://www.google.com/maps/search/?api=1&query=9.9312,76.2673"));

        // camp list is public
        let response = api_router(state)
            .oneshot(request("GET", "/api/health-camps?upcoming=true", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["camp_types"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn worker_emergency_flow() {
        let (_dir, state) = test_state();
        let (worker, worker_id) = worker_token(&state);
        let gov = government_token(&state);

        let body = r#"{"type":"medical","description":"High fever","latitude":9.9,"longitude":76.3}"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/emergency", Some(&worker), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = response_json(response).await;
        let emergency_id = json["emergency"]["id"].as_str().unwrap().to_string();
        assert_eq!(json["emergency"]["worker_id"], worker_id.to_string());
        assert_eq!(json["emergency"]["status"], "pending");

        // worker sees their own request
        let response = api_router(state.clone())
            .oneshot(request(
                "GET",
                "/api/emergency/my-requests",
                Some(&worker),
                None,
            ))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["emergencies"].as_array().unwrap().len(), 1);

        // government resolves it
        let response = api_router(state.clone())
            .oneshot(request(
                "PUT",
                &format!("/api/emergency/{emergency_id}"),
                Some(&gov),
                Some(r#"{"status":"resolved"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["emergency"]["status"], "resolved");

        // listing joins worker identity
        let response = api_router(state)
            .oneshot(request(
                "GET",
                "/api/emergency?status=resolved",
                Some(&gov),
                None,
            ))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["emergencies"][0]["worker_name"], "Ramesh Kumar");
    }

    #[tokio::test]
    async fn otp_flow_issue_verify_single_use() {
        let (_dir, state) = test_state();

        let conn = state.open_db().unwrap();
        let worker = Worker {
            id: Uuid::new_v4(),
            unique_id: "MHB-2024-009".into(),
            name: "Sunita Das".into(),
            age: None,
            gender: None,
            origin_state: None,
            phone: Some("9876543216".into()),
            current_district: None,
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
        };
        insert_worker(&conn, &worker).unwrap();

        // unknown phone
        let response = api_router(state.clone())
            .oneshot(request(
                "POST",
                "/api/worker-auth/request-otp",
                None,
                Some(r#"{"phone":"0000000000"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // request a code; demo mode echoes it
        let response = api_router(state.clone())
            .oneshot(request(
                "POST",
                "/api/worker-auth/request-otp",
                None,
                Some(r#"{"phone":"9876543216"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let otp = json["otp_for_testing"].as_str().unwrap().to_string();
        assert_eq!(otp.len(), 6);

        // wrong code
        let response = api_router(state.clone())
            .oneshot(request(
                "POST",
                "/api/worker-auth/verify-otp",
                None,
                Some(r#"{"phone":"9876543216","otp":"000000"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // right code issues a worker token
        let body = format!(r#"{{"phone":"9876543216","otp":"{otp}"}}"#);
        let response = api_router(state.clone())
            .oneshot(request(
                "POST",
                "/api/worker-auth/verify-otp",
                None,
                Some(&body),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let token = json["token"].as_str().unwrap().to_string();
        assert_eq!(json["worker"]["uniqueId"], "MHB-2024-009");

        // the code is single-use: replay fails
        let response = api_router(state.clone())
            .oneshot(request(
                "POST",
                "/api/worker-auth/verify-otp",
                None,
                Some(&body),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // the issued token works on the worker surface
        let response = api_router(state)
            .oneshot(request("GET", "/api/worker-auth/me", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["worker"]["unique_id"], "MHB-2024-009");
    }

    #[tokio::test]
    async fn expired_otp_fails_with_expired_code() {
        let (_dir, state) = test_state();

        let conn = state.open_db().unwrap();
        let worker = Worker {
            id: Uuid::new_v4(),
            unique_id: "MHB-2024-010".into(),
            name: "Vijay Patel".into(),
            age: None,
            gender: None,
            origin_state: None,
            phone: Some("9876543217".into()),
            current_district: None,
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
        };
        insert_worker(&conn, &worker).unwrap();

        // store a matching but elapsed code
        crate::db::repository::set_otp(
            &conn,
            &worker.id,
            "123456",
            Utc::now() - chrono::Duration::minutes(1),
        )
        .unwrap();

        let response = api_router(state)
            .oneshot(request(
                "POST",
                "/api/worker-auth/verify-otp",
                None,
                Some(r#"{"phone":"9876543217","otp":"123456"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "OTP_EXPIRED");
    }

    #[tokio::test]
    async fn login_flow_against_seeded_accounts() {
        let (_dir, state) = test_state();
        {
            let conn = state.open_db().unwrap();
            crate::seed::seed_demo_data(&conn).unwrap();
        }

        let body = format!(
            r#"{{"email":"{}","password":"{}"}}"#,
            crate::seed::DEMO_DOCTOR_EMAIL,
            crate::seed::DEMO_DOCTOR_PASSWORD
        );
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/auth/login", None, Some(&body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let token = json["token"].as_str().unwrap().to_string();
        assert_eq!(json["user"]["role"], "doctor");
        assert_eq!(json["user"]["hospitalName"], "General Hospital Ernakulam");

        // wrong password
        let body = format!(
            r#"{{"email":"{}","password":"nope"}}"#,
            crate::seed::DEMO_DOCTOR_EMAIL
        );
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/auth/login", None, Some(&body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // token works on /auth/me
        let response = api_router(state.clone())
            .oneshot(request("GET", "/api/auth/me", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // seeded workers are listable
        let response = api_router(state)
            .oneshot(request(
                "GET",
                "/api/workers?district=Ernakulam",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["workers"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn register_duplicate_email_conflicts() {
        let (_dir, state) = test_state();

        let body = r#"{"email":"new@hospital.test","password":"pw","name":"Dr. New","role":"doctor"}"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/auth/register", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/auth/register", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bad_role =
            r#"{"email":"x@hospital.test","password":"pw","name":"X","role":"admin"}"#;
        let response = api_router(state)
            .oneshot(request("POST", "/api/auth/register", None, Some(bad_role)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn worker_history_joins_doctor_names() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        let create = r#"{"uniqueId":"MHB-2024-020","name":"Priya Devi"}"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/workers", Some(&token), Some(create)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let case = r#"{"workerUniqueId":"MHB-2024-020","diagnosis":"Typhoid","medications":[{"name":"Ciprofloxacin","dosage":"500mg","frequency":"BD"}]}"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/cases", Some(&token), Some(case)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = api_router(state.clone())
            .oneshot(request(
                "GET",
                "/api/workers/MHB-2024-020/history",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["worker"]["unique_id"], "MHB-2024-020");
        assert_eq!(json["history"][0]["diagnosis"], "Typhoid");
        assert_eq!(json["history"][0]["doctor_name"], "Dr. Arun Kumar");

        let response = api_router(state)
            .oneshot(request(
                "GET",
                "/api/workers/MHB-9999-999/history",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn heatmap_merges_identical_coordinates() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        for diagnosis in ["Dengue Fever", "Dengue Fever", "Malaria"] {
            let body = format!(
                r#"{{"diagnosis":"{diagnosis}","medications":[{{"name":"Paracetamol"}}],"district":"Ernakulam","latitude":9.9816,"longitude":76.2999}}"#
            );
            let response = api_router(state.clone())
                .oneshot(request("POST", "/api/cases", Some(&token), Some(&body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = api_router(state)
            .oneshot(request("GET", "/api/cases/heatmap", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["rawCases"], 3);
        let points = json["heatmapData"].as_array().unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0]["weight"], 3);
        assert_eq!(points[0]["diagnoses"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn notifications_are_pollable_after_camp_creation() {
        let (_dir, state) = test_state();
        let gov = government_token(&state);

        let body = r#"{"camp_name":"Eye Camp Kochi","camp_type":"Eye Camp","location_name":"Town Hall","scheduled_date":"2031-03-10T10:00:00Z"}"#;
        let response = api_router(state.clone())
            .oneshot(request("POST", "/api/health-camps", Some(&gov), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = api_router(state)
            .oneshot(request("GET", "/api/notifications", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let notifications = json["notifications"].as_array().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["title"], "New Health Camp: Eye Camp Kochi");
        assert_eq!(notifications[0]["type"], "health_camp");
    }

    #[tokio::test]
    async fn upload_rejects_non_audio_and_missing_file() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"note.txt\"\r\nContent-Type: text/plain\r\n\r\nhello\r\n--{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/uploads/voice-note")
            .header("Authorization", format!("Bearer {token}"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = api_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let empty = format!("--{boundary}--\r\n");
        let req = Request::builder()
            .method("POST")
            .uri("/api/uploads/voice-note")
            .header("Authorization", format!("Bearer {token}"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(empty))
            .unwrap();
        let response = api_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_stores_audio_and_serves_it_back() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"note.webm\"\r\nContent-Type: audio/webm\r\n\r\nfake-audio-bytes\r\n--{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/uploads/voice-note")
            .header("Authorization", format!("Bearer {token}"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = api_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let url = json["url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/uploads/voice-notes/voice-"));
        assert!(url.ends_with(".webm"));

        // the stored file is served back at the public path
        let response = api_router(state)
            .oneshot(request("GET", &url, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"fake-audio-bytes");
    }

    #[tokio::test]
    async fn fetch_worker_requires_token_and_resolves() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        {
            let conn = state.open_db().unwrap();
            insert_worker(
                &conn,
                &Worker {
                    id: Uuid::new_v4(),
                    unique_id: "MHB-2024-030".into(),
                    name: "Anil Sharma".into(),
                    age: Some(40),
                    gender: None,
                    origin_state: None,
                    phone: None,
                    current_district: Some("Palakkad".into()),
                    latitude: Some(10.78670000),
                    longitude: Some(76.65480000),
                    created_at: Utc::now(),
                },
            )
            .unwrap();
        }

        let response = api_router(state.clone())
            .oneshot(request("GET", "/api/workers/MHB-2024-030", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = api_router(state)
            .oneshot(request(
                "GET",
                "/api/workers/MHB-2024-030",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["worker"]["current_district"], "Palakkad");
        assert_eq!(json["worker"]["latitude"], 10.7867);
    }

    #[tokio::test]
    async fn trends_flatten_diagnosis_counts() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        for _ in 0..2 {
            let body = r#"{"diagnosis":"Dengue Fever","medications":[{"name":"Paracetamol"}]}"#;
            let response = api_router(state.clone())
                .oneshot(request("POST", "/api/cases", Some(&token), Some(body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = api_router(state)
            .oneshot(request("GET", "/api/cases/trends", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let trends = json["trends"].as_array().unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0]["Dengue Fever"], 2);
    }

    #[tokio::test]
    async fn unknown_worker_lookup_is_404() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);

        let response = api_router(state)
            .oneshot(request("GET", "/api/workers/MHB-NONE", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // the verbatim-unique-id flow above already covers lookups; keep a
    // sanity check that listing respects pagination
    #[tokio::test]
    async fn worker_listing_pagination() {
        let (_dir, state) = test_state();
        let token = doctor_token(&state);
        {
            let conn = state.open_db().unwrap();
            for i in 0..5 {
                insert_worker(
                    &conn,
                    &Worker {
                        id: Uuid::new_v4(),
                        unique_id: format!("MHB-2024-10{i}"),
                        name: format!("Worker {i}"),
                        age: None,
                        gender: None,
                        origin_state: None,
                        phone: None,
                        current_district: Some("Kollam".into()),
                        latitude: None,
                        longitude: None,
                        created_at: Utc::now(),
                    },
                )
                .unwrap();
            }
        }

        let response = api_router(state)
            .oneshot(request(
                "GET",
                "/api/workers?limit=2&offset=2",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["workers"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn fetch_worker_round_trips_via_repository() {
        let (_dir, state) = test_state();
        let conn = state.open_db().unwrap();
        insert_worker(
            &conn,
            &Worker {
                id: Uuid::new_v4(),
                unique_id: "MHB-2024-200".into(),
                name: "Lakshmi Kumari".into(),
                age: Some(29),
                gender: Some("Female".into()),
                origin_state: Some("West Bengal".into()),
                phone: None,
                current_district: Some("Kollam".into()),
                latitude: Some(8.8932),
                longitude: Some(76.6141),
                created_at: Utc::now(),
            },
        )
        .unwrap();

        let worker = get_worker_by_unique_id(&conn, "MHB-2024-200")
            .unwrap()
            .unwrap();
        assert_eq!(worker.origin_state.as_deref(), Some("West Bengal"));
    }
}
