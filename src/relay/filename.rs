//! Outbound filename normalization.
//!
//! The caller's filename is never forwarded. Only its extension survives,
//! attached to a timestamped stem, and anything outside `[A-Za-z0-9._-]`
//! becomes `_`.

use chrono::Utc;
use std::fmt;

/// Extension used when the original name has none.
pub const DEFAULT_EXTENSION: &str = "bin";

const STEM_PREFIX: &str = "upload_";

/// A filename safe to hand to the upstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedFilename(String);

impl SanitizedFilename {
    /// Build `upload_<unix_millis>.<ext>` from the original filename.
    pub fn new(original: Option<&str>, unix_millis: i64) -> Self {
        let ext = extension_of(original.unwrap_or_default());
        Self(sanitize(&format!("{STEM_PREFIX}{unix_millis}.{ext}")))
    }

    /// Same as [`SanitizedFilename::new`], stamped with the current time.
    pub fn now(original: Option<&str>) -> Self {
        Self::new(original, Utc::now().timestamp_millis())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SanitizedFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text after the last `.`, or [`DEFAULT_EXTENSION`] when there is none.
pub fn extension_of(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => DEFAULT_EXTENSION,
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if is_safe(c) { c } else { '_' })
        .collect()
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}
