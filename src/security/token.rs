//! Shared-secret check on `X-Proxy-Token`.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::RelayError;

pub const X_PROXY_TOKEN: &str = "x-proxy-token";

/// Compare the presented header against the expected secret in constant time.
pub fn token_matches(expected: &str, presented: Option<&HeaderValue>) -> bool {
    match presented {
        Some(value) => value.as_bytes().ct_eq(expected.as_bytes()).into(),
        None => false,
    }
}

/// Reject requests without the right `X-Proxy-Token` when a secret is set.
/// With no secret configured every request passes.
pub async fn require_proxy_token(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, RelayError> {
    let Some(expected) = state.config.security.proxy_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    if token_matches(expected, request.headers().get(X_PROXY_TOKEN)) {
        return Ok(next.run(request).await);
    }

    tracing::warn!(
        request_id = %request_id(request.headers()),
        path = %request.uri().path(),
        token_present = request.headers().contains_key(X_PROXY_TOKEN),
        "Rejected request with invalid proxy token"
    );
    metrics::record_request(request.uri().path(), StatusCode::UNAUTHORIZED);
    Err(RelayError::Unauthorized)
}
