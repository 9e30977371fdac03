//! Upload relay core.
//!
//! # Data Flow
//! ```text
//! POST /upload (multipart)
//!     → upload.rs    (buffer the `file` part, enforce the size limit)
//!     → filename.rs  (upload_<unixMillis>.<ext>, safe character set)
//!     → upstream.rs  (fresh multipart body + bearer credential → upstream)
//!     → UpstreamResponse (status + raw body, forwarded unmodified)
//! ```
//!
//! Failures on the way are `error::RelayError` values with a fixed status
//! and JSON body each.

pub mod error;
pub mod filename;
pub mod upload;
pub mod upstream;

pub use error::RelayError;
pub use filename::SanitizedFilename;
pub use upload::{read_upload, IncomingUpload};
pub use upstream::{UpstreamClient, UpstreamResponse};
