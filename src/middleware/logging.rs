//! Request logging middleware.
//!
//! Wraps each request in an `http_request` span keyed by the matched route,
//! so handler logs (login attempts, data-access faults) carry the request
//! they belong to.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{field, info, info_span, warn, Instrument};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Route template for the request (`/editcar/:id`), falling back to the raw
/// path for requests no route matched.
fn route_of(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Middleware that logs HTTP requests with timing information.
///
/// 5xx responses are logged at WARN, everything else at INFO.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let route = route_of(&request);

    // Skip logging for health checks to reduce noise
    if route == "/health" {
        return next.run(request).await;
    }

    let span = info_span!(
        "http_request",
        id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
        method = %request.method(),
        route = %route,
        path = %request.uri().path(),
        status = field::Empty,
        latency_ms = field::Empty,
    );

    async move {
        let start = Instant::now();
        let response = next.run(request).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        let status = response.status();

        let current = tracing::Span::current();
        current.record("status", status.as_u16());
        current.record("latency_ms", latency_ms);

        if status.is_server_error() {
            warn!(status = status.as_u16(), latency_ms, "Request failed (5xx)");
        } else if status.is_client_error() {
            info!(status = status.as_u16(), latency_ms, "Request rejected (4xx)");
        } else {
            info!(status = status.as_u16(), latency_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}
