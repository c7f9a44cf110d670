//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_APP_KEY: &str = "silkmall";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATE_DIR: &str = ".silkmall";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST API root, without a trailing slash.
    pub api_base_url: String,
    /// Prefix for storage keys (`<app>.auth`, `<app>.guest-mode`).
    pub app_key: String,
    /// Fixed per-request deadline.
    pub request_timeout: Duration,
    /// Directory holding the native durable store.
    pub state_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            app_key: DEFAULT_APP_KEY.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `SILKMALL_API_BASE_URL`: default `http://127.0.0.1:8080/api`
    /// - `SILKMALL_APP_KEY`: default `silkmall`
    /// - `SILKMALL_REQUEST_TIMEOUT_SECS`: default 10
    /// - `SILKMALL_STATE_DIR`: default `.silkmall`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is present but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = normalize_base_url(
            &std::env::var("SILKMALL_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned()),
        );

        let app_key = std::env::var("SILKMALL_APP_KEY").unwrap_or_else(|_| DEFAULT_APP_KEY.to_owned());
        let app_key = app_key.trim().to_owned();
        if app_key.is_empty() {
            return Err(ConfigError::Invalid { var: "SILKMALL_APP_KEY", reason: "must not be empty".into() });
        }

        let request_timeout = Duration::from_secs(parse_timeout_secs(
            std::env::var("SILKMALL_REQUEST_TIMEOUT_SECS").ok().as_deref(),
        )?);

        let state_dir = std::env::var("SILKMALL_STATE_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);

        Ok(Self { api_base_url, app_key, request_timeout, state_dir })
    }

    /// Durable storage key holding the authenticated session payload.
    #[must_use]
    pub fn auth_storage_key(&self) -> String {
        format!("{}.auth", self.app_key)
    }

    /// Transient storage key holding the guest-mode flag.
    #[must_use]
    pub fn guest_storage_key(&self) -> String {
        format!("{}.guest-mode", self.app_key)
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_timeout_secs(raw: Option<&str>) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_REQUEST_TIMEOUT_SECS);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid { var: "SILKMALL_REQUEST_TIMEOUT_SECS", reason: "must be positive".into() }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::Invalid { var: "SILKMALL_REQUEST_TIMEOUT_SECS", reason: e.to_string() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
