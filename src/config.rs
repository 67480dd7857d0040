//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TOKEN_FILE: &str = ".fanimal/storage.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The backend URL is not an absolute http(s) URL.
    #[error("invalid backend URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST base URL without a trailing slash, e.g. `https://fanimal.example/api`.
    pub base_url: String,
    /// Location of the durable key/value file holding the bearer token.
    pub token_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build a config for `base_url` with default storage path and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless the URL is http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            timeouts: Timeouts::default(),
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `FANIMAL_BACKEND_URL`: default `http://localhost:8080/api`
    /// - `FANIMAL_TOKEN_FILE`: default `.fanimal/storage.json`
    /// - `FANIMAL_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FANIMAL_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the backend URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("FANIMAL_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let token_file = std::env::var("FANIMAL_TOKEN_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE), PathBuf::from);
        let timeouts = Timeouts {
            request_secs: env_parse_u64("FANIMAL_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("FANIMAL_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url: normalize_base_url(&base_url)?, token_file, timeouts })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match host {
        Some(rest) if !rest.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidBaseUrl(raw.to_string())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
