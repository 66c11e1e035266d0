//! Client configuration.
//!
//! Loaded from environment variables; anything unset falls back to a
//! default suitable for a local backend.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_API_URL: &str = "ITEMATIC_API_URL";
pub const ENV_SESSION_FILE: &str = "ITEMATIC_SESSION_FILE";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ITEMATIC_HTTP_TIMEOUT_SECS";
pub const ENV_LANDING_PATH: &str = "ITEMATIC_LANDING_PATH";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must be an http(s) URL, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without a trailing slash.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Where the session is persisted. `None` keeps it in memory only.
    #[serde(default = "default_session_file")]
    pub session_file: Option<PathBuf>,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Destination for unauthenticated visitors of guarded routes.
    #[serde(default = "default_landing_path")]
    pub landing_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_file: default_session_file(),
            request_timeout_secs: default_timeout_secs(),
            landing_path: default_landing_path(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_session_file() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("itematic").join("session.json"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_landing_path() -> String {
    crate::DEFAULT_LANDING.to_string()
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            let url = url.trim().trim_end_matches('/').to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    var: ENV_API_URL,
                    value: url,
                });
            }
            config.api_base_url = url;
        }

        if let Some(path) = lookup(ENV_SESSION_FILE) {
            let path = path.trim();
            config.session_file = if path.is_empty() { None } else { Some(PathBuf::from(path)) };
        }

        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            config.request_timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout {
                    var: ENV_HTTP_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
        }

        if let Some(landing) = lookup(ENV_LANDING_PATH).filter(|v| !v.trim().is_empty()) {
            config.landing_path = landing.trim().to_string();
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.landing_path, "/");
    }

    #[test]
    fn overrides_are_applied() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://inventory.example.com/api/v1/"),
            (ENV_SESSION_FILE, "/tmp/itematic-session.json"),
            (ENV_HTTP_TIMEOUT_SECS, "5"),
            (ENV_LANDING_PATH, "/login"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://inventory.example.com/api/v1");
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/itematic-session.json")));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.landing_path, "/login");
    }

    #[test]
    fn empty_session_file_means_memory_only() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_SESSION_FILE, "")])).unwrap();
        assert_eq!(config.session_file, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));

        let err = ClientConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));

        let err = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "localhost:8000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }
}
