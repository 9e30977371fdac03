//! Request size limits.
//!
//! The configured limit applies to the file. The request body also carries
//! multipart framing and small text fields, so the body budget is the file
//! limit plus a fixed allowance. A declared `Content-Length` over budget is
//! rejected here, before the handler runs; bodies without a declared length
//! are cut off by `DefaultBodyLimit` while the handler reads them.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::RelayError;

/// Room for boundaries, part headers and non-file fields.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Largest request body accepted on `/upload` for a given file limit.
pub fn body_budget(max_upload_bytes: usize) -> usize {
    max_upload_bytes.saturating_add(MULTIPART_OVERHEAD)
}

/// Declared body length, if the header is present and numeric.
pub fn declared_length(request: &Request<Body>) -> Option<u64> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Answer 413 when the declared `Content-Length` exceeds the body budget.
pub async fn enforce_body_budget(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, RelayError> {
    let max_bytes = state.config.security.max_upload_bytes;
    let budget = body_budget(max_bytes) as u64;

    match declared_length(&request) {
        Some(length) if length > budget => {
            tracing::warn!(
                request_id = %request_id(request.headers()),
                content_length = length,
                budget,
                "Rejected oversized request body"
            );
            metrics::record_request(request.uri().path(), StatusCode::PAYLOAD_TOO_LARGE);
            Err(RelayError::PayloadTooLarge { max_bytes })
        }
        _ => Ok(next.run(request).await),
    }
}
