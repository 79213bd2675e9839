//! Client configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file by
//! the binary). Every setting has a default so a bare environment works
//! against a local backend.

use std::time::Duration;

use thiserror::Error;

use crate::api::auth::DEFAULT_SERVICE_NAME;
use crate::api::session::DEFAULT_LOGIN_URL;

/// The backend mounts its routers under `/api`.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_BASE_URL: &str = "TRUSTFLOW_API_URL";
pub const ENV_LOGIN_URL: &str = "TRUSTFLOW_LOGIN_URL";
pub const ENV_TIMEOUT_SECS: &str = "TRUSTFLOW_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "TRUSTFLOW_CONNECT_TIMEOUT_SECS";
pub const ENV_KEYCHAIN_SERVICE: &str = "TRUSTFLOW_KEYCHAIN_SERVICE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every endpoint path, without a trailing slash.
    pub base_url: String,
    /// Where the user is sent to sign in again after a 401.
    pub login_url: String,
    /// Overall per-request limit. `None` waits for the backend indefinitely.
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
    /// Keychain service the session token is stored under.
    pub keychain_service: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            timeout: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            keychain_service: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults with a different base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            base_url: non_empty(ENV_BASE_URL).unwrap_or(defaults.base_url),
            login_url: non_empty(ENV_LOGIN_URL).unwrap_or(defaults.login_url),
            timeout: match non_empty(ENV_TIMEOUT_SECS) {
                Some(v) => Some(parse_seconds(ENV_TIMEOUT_SECS, &v)?),
                None => defaults.timeout,
            },
            connect_timeout: match non_empty(ENV_CONNECT_TIMEOUT_SECS) {
                Some(v) => parse_seconds(ENV_CONNECT_TIMEOUT_SECS, &v)?,
                None => defaults.connect_timeout,
            },
            keychain_service: non_empty(ENV_KEYCHAIN_SERVICE)
                .unwrap_or(defaults.keychain_service),
        })
    }
}

fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidSeconds {
            var,
            value: value.to_string(),
        })
}
