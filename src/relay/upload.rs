//! Inbound multipart intake.

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::relay::error::RelayError;

/// Form field carrying the file, both inbound and outbound.
pub const FILE_FIELD: &str = "file";

/// Content type forwarded when the caller declared none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The buffered file from one `/upload` request.
#[derive(Debug, Clone)]
pub struct IncomingUpload {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl IncomingUpload {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Read parts until the first `file` part carrying a filename and buffer it.
///
/// Other parts are skipped. A `file` part without a filename is a plain text
/// field, not a file, and is skipped too. At most `max_bytes` of file content
/// are held in memory.
pub async fn read_upload(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<IncomingUpload, RelayError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) || field.file_name().is_none() {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);

        let mut buf = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            if buf.len() + chunk.len() > max_bytes {
                return Err(RelayError::PayloadTooLarge { max_bytes });
            }
            buf.extend_from_slice(&chunk);
        }

        return Ok(IncomingUpload {
            bytes: Bytes::from(buf),
            file_name,
            content_type,
        });
    }

    Err(RelayError::MissingFile)
}

// The body limit surfaces as a multipart error mid-stream.
fn multipart_error(err: MultipartError, max_bytes: usize) -> RelayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge { max_bytes }
    } else {
        RelayError::InvalidMultipart(err)
    }
}
