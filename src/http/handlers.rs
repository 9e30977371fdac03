//! Route handlers.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::request_id;
use crate::http::server::{AppState, UPLOAD_PATH};
use crate::observability::metrics;
use crate::relay::{read_upload, RelayError, SanitizedFilename, UpstreamResponse};

pub const HEALTH_BODY: &str = "🟢 Vapi upload proxy running";

/// `GET /`: liveness only, no dependencies.
pub async fn health() -> &'static str {
    HEALTH_BODY
}

/// `POST /upload`: relay one multipart file to the upstream API.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = request_id(&headers);

    let response = match relay_upload(&state, request_id, multipart).await {
        Ok(upstream) => upstream.into_response(),
        Err(err) => err.into_response(),
    };

    metrics::record_request(UPLOAD_PATH, response.status());
    response
}

async fn relay_upload(
    state: &AppState,
    request_id: &str,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UpstreamResponse, RelayError> {
    // A body that is not multipart at all has no file part either.
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(request_id = %request_id, reason = %rejection, "Not a multipart body");
        RelayError::MissingFile
    })?;

    let upload = read_upload(&mut multipart, state.config.security.max_upload_bytes).await?;
    let filename = SanitizedFilename::now(upload.file_name.as_deref());

    tracing::info!(
        request_id = %request_id,
        filename = %filename,
        content_type = %upload.content_type_or_default(),
        size = upload.size(),
        "POST /upload accepted"
    );
    metrics::record_upload_size(upload.size());

    let upstream = state.upstream.forward(upload, &filename).await?;
    if upstream.status == StatusCode::UNAUTHORIZED && state.config.upstream.api_key.is_none() {
        tracing::warn!(request_id = %request_id, "Upstream returned 401 and no credential is configured");
    }
    Ok(upstream)
}
