//! Relay error kinds and their HTTP mapping.
//!
//! Client mistakes (401, 400, 413) answer with `{"message": ...}`; relay-side
//! failures (5xx) answer with `{"error": ...}`. Upstream detail is logged,
//! never echoed to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors that end an `/upload` request before an upstream response exists.
#[derive(Debug, Error)]
pub enum RelayError {
    /// `X-Proxy-Token` missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// No `file` part in the request.
    #[error("file is required")]
    MissingFile,

    /// The multipart body could not be parsed.
    #[error("invalid multipart body")]
    InvalidMultipart(#[source] axum::extract::multipart::MultipartError),

    /// File larger than the configured limit.
    #[error("file exceeds maximum upload size of {max_bytes} bytes")]
    PayloadTooLarge { max_bytes: usize },

    /// The outbound body could not be built.
    #[error("failed to encode upstream request")]
    Encoding(#[source] reqwest::Error),

    /// Upstream did not answer within the configured timeout.
    #[error("upstream request timed out")]
    UpstreamTimeout(#[source] reqwest::Error),

    /// Connection or transport failure talking to the upstream.
    #[error("upstream request failed")]
    Upstream(#[source] reqwest::Error),
}

impl RelayError {
    /// Classify a failed outbound call.
    pub fn from_upstream(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::UpstreamTimeout(err)
        } else if err.is_builder() {
            Self::Encoding(err)
        } else {
            Self::Upstream(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingFile | Self::InvalidMultipart(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Encoding(_) | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        let body = if status.is_server_error() {
            let source = std::error::Error::source(&self)
                .map(ToString::to_string)
                .unwrap_or_default();
            tracing::error!(status = status.as_u16(), error = %message, source = %source, "Upload relay failed");
            json!({ "error": message })
        } else {
            tracing::debug!(status = status.as_u16(), reason = %message, "Upload rejected");
            json!({ "message": message })
        };

        (status, Json(body)).into_response()
    }
}
