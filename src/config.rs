use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8001";
pub const DEFAULT_LOG_FILE_NAME: &str = "consul-chat.log";

pub const SERVER_URL_VAR: &str = "CONSUL_SERVER_URL";
pub const SESSION_ID_VAR: &str = "CONSUL_SESSION_ID";
pub const TIMEOUT_VAR: &str = "CONSUL_TIMEOUT_SECS";
pub const LOG_FILE_VAR: &str = "CONSUL_LOG_FILE";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("server url '{0}' must use http or https")]
    UnsupportedScheme(String),

    #[error("invalid timeout '{0}': expected a whole number of seconds")]
    InvalidTimeout(String),
}

/// Runtime settings for the chat client.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base url of the assistant service, without a trailing slash.
    pub server_url: String,
    /// Sent with every question so the service can group a conversation.
    pub session_id: String,
    /// `None` means a request may stay outstanding forever.
    pub timeout: Option<Duration>,
    pub log_file: PathBuf,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let server_url = normalize_server_url(
            &non_empty(SERVER_URL_VAR).unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
        )?;

        let session_id = non_empty(SESSION_ID_VAR).unwrap_or_else(new_session_id);

        let timeout = match non_empty(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => None,
        };

        let log_file = non_empty(LOG_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(DEFAULT_LOG_FILE_NAME));

        Ok(Self {
            server_url,
            session_id,
            timeout,
            log_file,
        })
    }

    pub fn with_server_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.server_url = normalize_server_url(url)?;
        Ok(self)
    }

    pub fn with_session_id(mut self, session_id: &str) -> Self {
        self.session_id = session_id.to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = path;
        self
    }
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn normalize_server_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

// 0 disables the timeout.
fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.timeout, None);
        assert!(config.log_file.ends_with(DEFAULT_LOG_FILE_NAME));
        assert!(uuid::Uuid::parse_str(&config.session_id).is_ok());
    }

    #[test]
    fn test_values_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            (SERVER_URL_VAR, "https://consulado.example/"),
            (SESSION_ID_VAR, "sesion-1"),
            (TIMEOUT_VAR, "30"),
            (LOG_FILE_VAR, "/var/log/consul.log"),
        ]))
        .unwrap();

        assert_eq!(config.server_url, "https://consulado.example");
        assert_eq!(config.session_id, "sesion-1");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.log_file, PathBuf::from("/var/log/consul.log"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[(SERVER_URL_VAR, "  "), (TIMEOUT_VAR, "")]))
                .unwrap();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_zero_timeout_means_unbounded() {
        let config = Config::from_lookup(lookup_from(&[(TIMEOUT_VAR, "0")])).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup_from(&[(SERVER_URL_VAR, "not a url")])),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert_eq!(
            Config::from_lookup(lookup_from(&[(SERVER_URL_VAR, "ftp://host")])),
            Err(ConfigError::UnsupportedScheme("ftp://host".to_string()))
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[(TIMEOUT_VAR, "soon")])),
            Err(ConfigError::InvalidTimeout("soon".to_string()))
        );
    }

    #[test]
    fn test_overrides() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup_from(&[]))?
            .with_server_url("http://127.0.0.1:9000/")?
            .with_session_id("fija")
            .with_timeout_secs(5);

        assert_eq!(config.server_url, "http://127.0.0.1:9000");
        assert_eq!(config.session_id, "fija");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        Ok(())
    }
}
