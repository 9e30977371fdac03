//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Points at an optional TOML file read before environment overrides.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG";

pub const API_KEY_ENV: &str = "VAPI_KEY";
pub const PROXY_TOKEN_ENV: &str = "PROXY_TOKEN";
pub const PORT_ENV: &str = "PORT";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
pub const UPSTREAM_URL_ENV: &str = "UPSTREAM_URL";
pub const UPSTREAM_PURPOSE_ENV: &str = "UPSTREAM_PURPOSE";
pub const UPSTREAM_TIMEOUT_ENV: &str = "UPSTREAM_TIMEOUT_SECS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the startup configuration: defaults, then the file named by
/// `RELAY_CONFIG` (if any), then environment overrides.
pub fn load_from_env() -> Result<RelayConfig, ConfigError> {
    let base = match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => read_config(Path::new(&path))?,
        _ => RelayConfig::default(),
    };

    let config = apply_env(base, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` resolves a variable name; blank values count as unset, except
/// for `UPSTREAM_PURPOSE` where an empty value drops the `purpose` field.
pub fn apply_env<F>(mut config: RelayConfig, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = var(API_KEY_ENV) {
        config.upstream.api_key = Some(key);
    }
    if let Some(token) = var(PROXY_TOKEN_ENV) {
        config.security.proxy_token = Some(token);
    }
    if let Some(port) = var(PORT_ENV) {
        config.listener.port = parse_var(PORT_ENV, port)?;
    }
    if let Some(limit) = var(MAX_UPLOAD_BYTES_ENV) {
        config.security.max_upload_bytes = parse_var(MAX_UPLOAD_BYTES_ENV, limit)?;
    }
    if let Some(url) = var(UPSTREAM_URL_ENV) {
        config.upstream.url = url;
    }
    if let Some(purpose) = lookup(UPSTREAM_PURPOSE_ENV) {
        let purpose = purpose.trim();
        config.upstream.purpose = (!purpose.is_empty()).then(|| purpose.to_string());
    }
    if let Some(secs) = var(UPSTREAM_TIMEOUT_ENV) {
        config.upstream.timeout_secs = parse_var(UPSTREAM_TIMEOUT_ENV, secs)?;
    }

    Ok(config)
}

fn read_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn parse_var<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { key, value })
}
