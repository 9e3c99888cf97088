use std::net::IpAddr;
use std::time::Duration;

use thiserror::Error;

pub const TOKEN_COOKIE: &str = "supervisor_token";

const DEFAULT_UPLOAD_LIMIT_MB: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the backend REST API, e.g. `https://api.example.com/v1`.
    pub api_base_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub request_timeout: Duration,
    /// Adds `Secure` to the session cookie.
    pub cookie_secure: bool,
    pub cors_origin: Option<String>,
    /// Request body limit of the product image upload route.
    pub upload_limit_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = get("SUPERVISOR_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPERVISOR_API_BASE_URL"))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "SUPERVISOR_API_BASE_URL",
                value: api_base_url,
            });
        }

        Ok(Self {
            api_base_url,
            host: parse_or("HOST", get("HOST"), IpAddr::from([127, 0, 0, 1]))?,
            port: parse_or("PORT", get("PORT"), 3000)?,
            request_timeout: Duration::from_secs(parse_or(
                "SUPERVISOR_REQUEST_TIMEOUT_SECS",
                get("SUPERVISOR_REQUEST_TIMEOUT_SECS"),
                30,
            )?),
            cookie_secure: parse_or("SUPERVISOR_COOKIE_SECURE", get("SUPERVISOR_COOKIE_SECURE"), false)?,
            cors_origin: get("SUPERVISOR_CORS_ORIGIN").filter(|v| !v.trim().is_empty()),
            upload_limit_bytes: parse_or::<usize>(
                "SUPERVISOR_UPLOAD_LIMIT_MB",
                get("SUPERVISOR_UPLOAD_LIMIT_MB"),
                DEFAULT_UPLOAD_LIMIT_MB,
            )?
            .saturating_mul(1024 * 1024),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
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
    fn defaults_apply_when_only_base_url_is_set() {
        let config =
            AppConfig::from_lookup(lookup(&[("SUPERVISOR_API_BASE_URL", "https://api.test")])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.cookie_secure);
        assert_eq!(config.cors_origin, None);
        assert_eq!(config.upload_limit_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn base_url_is_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SUPERVISOR_API_BASE_URL"));
    }

    #[test]
    fn rejects_malformed_values() {
        let err = AppConfig::from_lookup(lookup(&[
            ("SUPERVISOR_API_BASE_URL", "https://api.test"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = AppConfig::from_lookup(lookup(&[("SUPERVISOR_API_BASE_URL", "api.test")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SUPERVISOR_API_BASE_URL", .. }));
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SUPERVISOR_API_BASE_URL", "http://backend:8080"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8081"),
            ("SUPERVISOR_COOKIE_SECURE", "true"),
            ("SUPERVISOR_CORS_ORIGIN", "https://admin.example.com"),
            ("SUPERVISOR_UPLOAD_LIMIT_MB", "5"),
        ]))
        .unwrap();
        assert_eq!(config.upload_limit_bytes, 5 * 1024 * 1024);
        assert_eq!(config.port, 8081);
        assert!(config.cookie_secure);
        assert_eq!(config.cors_origin.as_deref(), Some("https://admin.example.com"));
    }
}
