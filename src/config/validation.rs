//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! Every problem is reported, not just the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a [`RelayConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("upstream.url {url:?} is not a valid URL: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("upstream.url {0:?} must use http or https")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("upstream.timeout_secs ({upstream}) must be less than timeouts.request_secs ({request})")]
    UpstreamTimeoutExceedsRequest { upstream: u64, request: u64 },

    #[error("security.proxy_token must not be blank")]
    BlankProxyToken,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration before it is accepted into the system.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(_) => errors.push(ValidationError::UnsupportedScheme(config.upstream.url.clone())),
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl {
            url: config.upstream.url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.connect_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    // Otherwise the whole-request backstop fires first and answers 408
    // instead of the relay's 504.
    if config.upstream.timeout_secs > 0
        && config.timeouts.request_secs > 0
        && config.upstream.timeout_secs >= config.timeouts.request_secs
    {
        errors.push(ValidationError::UpstreamTimeoutExceedsRequest {
            upstream: config.upstream.timeout_secs,
            request: config.timeouts.request_secs,
        });
    }
    if config.security.max_upload_bytes == 0 {
        errors.push(ValidationError::ZeroValue("security.max_upload_bytes"));
    }

    if let Some(token) = &config.security.proxy_token {
        if token.trim().is_empty() {
            errors.push(ValidationError::BlankProxyToken);
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
