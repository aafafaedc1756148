//! Middleware
//!
//! Cross-cutting HTTP pieces: request spans, request ids and CORS.

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request};
use tower_http::cors::{AllowHeaders, CorsLayer};
use tracing::{info_span, warn, Span};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Span for one request, tagged with the id set by `SetRequestIdLayer`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Origins come from configuration; unparsable entries are skipped with a warning.
pub fn cors_policy(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
