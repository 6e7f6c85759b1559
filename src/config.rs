//! # API Configuration
//!
//! Where the API lives and how requests authenticate. Defaults match a local development
//! server; [`ApiConfig::from_env`] overrides them from `CRUD_SYNC_*` environment variables.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_API_URL: &str = "CRUD_SYNC_API_URL";
pub const ENV_LOGIN_URL: &str = "CRUD_SYNC_LOGIN_URL";
pub const ENV_CREDENTIALS: &str = "CRUD_SYNC_CREDENTIALS";
pub const ENV_TIMEOUT_SECS: &str = "CRUD_SYNC_TIMEOUT_SECS";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Whether requests carry cookies, after the Fetch API's `credentials` option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    #[default]
    Include,
    SameOrigin,
    Omit,
}

impl FromStr for Credentials {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "include" => Ok(Credentials::Include),
            "same-origin" => Ok(Credentials::SameOrigin),
            "omit" => Ok(Credentials::Omit),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is appended to.
    pub api_url: String,
    /// Where to send the user when the API answers 403.
    pub login_url: String,
    pub credentials: Credentials,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3001/api/v1".to_string(),
            login_url: "/login".to_string(),
            credentials: Credentials::Include,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Defaults overridden by whichever `CRUD_SYNC_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(url) = lookup(ENV_LOGIN_URL) {
            config.login_url = url;
        }
        if let Some(value) = lookup(ENV_CREDENTIALS) {
            config.credentials = value.parse().map_err(|value| ConfigError::InvalidValue {
                name: ENV_CREDENTIALS,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT_SECS,
                value,
            })?;
        }

        Ok(config)
    }

    /// Full URL for a request path: `{api_url}/{path}`.
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.api_url, path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `{base}/{path}`, with at most one slash between the two.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}
