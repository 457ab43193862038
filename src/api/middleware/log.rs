//! Request logging middleware. Runs outermost so rejected requests are
//! logged too.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

pub async fn trace_requests(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "request"
    );

    response
}
