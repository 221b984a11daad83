//! Runtime configuration: backend and geocoder endpoints, API key, session file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_LISTING_PATH: &str = "/api/litterlogs";
pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_SESSION_PATH: &str = ".litterlog/session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(String),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the backend API, without trailing path.
    pub backend_url: String,
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    pub geocode_api_key: String,
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_listing_path() -> String {
    DEFAULT_LISTING_PATH.to_string()
}

fn default_geocode_url() -> String {
    DEFAULT_GEOCODE_URL.to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_PATH)
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests never touch the real env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &str| -> Result<String, ConfigError> {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::Missing(var.to_string()))
        };
        let or_default = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let timeout_raw = or_default(
            "REQUEST_TIMEOUT_SECS",
            &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
        );
        let request_timeout_secs =
            timeout_raw
                .parse::<u64>()
                .map_err(|e| ConfigError::Invalid {
                    var: "REQUEST_TIMEOUT_SECS".to_string(),
                    reason: e.to_string(),
                })?;

        let config = Config {
            backend_url: require("BACKEND_URL")?,
            listing_path: or_default("LISTING_PATH", DEFAULT_LISTING_PATH),
            geocode_url: or_default("GEOCODE_URL", DEFAULT_GEOCODE_URL),
            geocode_api_key: require("GEOCODE_API_KEY")?,
            session_path: PathBuf::from(or_default("SESSION_PATH", DEFAULT_SESSION_PATH)),
            request_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would otherwise surface later as malformed requests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var, value) in [
            ("backend_url", &self.backend_url),
            ("geocode_url", &self.geocode_url),
        ] {
            Url::parse(value).map_err(|e| ConfigError::Invalid {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        }

        if self.geocode_api_key.trim().is_empty() {
            return Err(ConfigError::Missing("geocode_api_key".to_string()));
        }
        if !self.listing_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                var: "listing_path".to_string(),
                reason: "must start with '/'".to_string(),
            });
        }
        Ok(())
    }

    /// Full URL of the incident listing endpoint.
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.backend_url.trim_end_matches('/'), self.listing_path)
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
    fn test_env_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("BACKEND_URL", "http://localhost:5000/"),
            ("GEOCODE_API_KEY", "abc"),
        ]))
        .unwrap();

        assert_eq!(config.listing_url(), "http://localhost:5000/api/litterlogs");
        assert_eq!(config.geocode_url, DEFAULT_GEOCODE_URL);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let err = Config::from_lookup(lookup(&[("BACKEND_URL", "http://localhost:5000")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref v) if v == "GEOCODE_API_KEY"));
    }

    #[test]
    fn test_bad_backend_url() {
        let err = Config::from_lookup(lookup(&[
            ("BACKEND_URL", "not a url"),
            ("GEOCODE_API_KEY", "abc"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_toml_file() {
        let toml = r#"
            backend_url = "https://api.example.com"
            listing_path = "/api/s3images"
            geocode_api_key = "k"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.listing_url(), "https://api.example.com/api/s3images");
        assert_eq!(config.session_path, PathBuf::from(DEFAULT_SESSION_PATH));
    }
}
