//! Outbound call to the file-ingestion API.

use axum::body::Bytes;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::filename::SanitizedFilename;
use crate::relay::upload::{IncomingUpload, DEFAULT_CONTENT_TYPE, FILE_FIELD};

const PURPOSE_FIELD: &str = "purpose";

/// Raw upstream answer. The body is never parsed; it is handed back to the
/// caller byte-for-byte, labelled `application/json`.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// Client for the configured upstream endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    purpose: Option<String>,
}

impl UpstreamClient {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("upload-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        if config.api_key.is_none() {
            tracing::warn!(url = %config.url, "No upstream credential configured; uploads will be rejected upstream");
        }

        Ok(Self {
            http,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            purpose: config.purpose.clone(),
        })
    }

    /// Re-encode `upload` as a fresh multipart body and POST it upstream.
    ///
    /// Any status the upstream returns is a successful relay; only transport
    /// failures are errors.
    pub async fn forward(
        &self,
        upload: IncomingUpload,
        filename: &SanitizedFilename,
    ) -> Result<UpstreamResponse, RelayError> {
        let form = self.build_form(upload, filename)?;

        // Content-Type (with boundary) is set by `multipart`.
        let mut request = self.http.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let started = Instant::now();
        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(UpstreamResponse { status, body })
        }
        .await;

        match result {
            Ok(response) => {
                metrics::record_upstream("response", started);
                tracing::info!(
                    status = response.status.as_u16(),
                    bytes = response.body.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Upstream responded"
                );
                Ok(response)
            }
            Err(e) => {
                let err = RelayError::from_upstream(e);
                let outcome = if matches!(err, RelayError::UpstreamTimeout(_)) {
                    "timeout"
                } else {
                    "error"
                };
                metrics::record_upstream(outcome, started);
                Err(err)
            }
        }
    }

    fn build_form(
        &self,
        upload: IncomingUpload,
        filename: &SanitizedFilename,
    ) -> Result<Form, RelayError> {
        let mut form = Form::new();
        if let Some(purpose) = &self.purpose {
            form = form.text(PURPOSE_FIELD, purpose.clone());
        }

        let content_type = upload.content_type_or_default().to_owned();
        let part = match file_part(upload.bytes.clone(), filename, &content_type) {
            Ok(part) => part,
            Err(e) => {
                tracing::warn!(content_type = %content_type, error = %e, "Unparseable content type, sending as octet-stream");
                file_part(upload.bytes, filename, DEFAULT_CONTENT_TYPE).map_err(RelayError::Encoding)?
            }
        };

        Ok(form.part(FILE_FIELD, part))
    }
}

fn file_part(
    bytes: Bytes,
    filename: &SanitizedFilename,
    content_type: &str,
) -> Result<Part, reqwest::Error> {
    let len = bytes.len() as u64;
    Part::stream_with_length(bytes, len)
        .file_name(filename.to_string())
        .mime_str(content_type)
}
