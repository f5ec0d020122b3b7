//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RATEHUB_API_URL` - Base URL of the Ratehub REST API
//!
//! ## Optional
//! - `RATEHUB_SESSION_FILE` - Path of the persisted session token
//!   (default: `<config dir>/ratehub/session.json`)
//! - `RATEHUB_STALE_TIME_SECS` - Default staleness window for list queries
//!   (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default staleness window for list queries (5 minutes).
const DEFAULT_STALE_TIME_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Ratehub client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, e.g. `https://api.ratehub.example`.
    pub api_url: Url,
    /// Where the session token is persisted across runs. `None` disables
    /// persistence (used by tests).
    pub session_file: Option<PathBuf>,
    /// Default staleness window applied to list queries.
    pub stale_time: Duration,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the API URL.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            session_file: default_session_file(),
            stale_time: Duration::from_secs(DEFAULT_STALE_TIME_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `RATEHUB_API_URL` is missing or unparseable,
    /// or an optional variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("RATEHUB_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("RATEHUB_API_URL".to_string(), e.to_string()))?;

        let session_file = std::env::var("RATEHUB_SESSION_FILE")
            .ok()
            .map(PathBuf::from)
            .or_else(default_session_file);

        let stale_time = match std::env::var("RATEHUB_STALE_TIME_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("RATEHUB_STALE_TIME_SECS".to_string(), e.to_string())
            })?),
            Err(_) => Duration::from_secs(DEFAULT_STALE_TIME_SECS),
        };

        Ok(Self {
            api_url,
            session_file,
            stale_time,
        })
    }

    /// Disable session persistence; the token lives only in memory.
    #[must_use]
    pub fn without_session_file(mut self) -> Self {
        self.session_file = None;
        self
    }
}

/// Default session file under the user's configuration directory.
fn default_session_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ratehub").join("session.json"))
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config = ClientConfig::new(Url::parse("http://localhost:8080").expect("url"));
        assert_eq!(config.stale_time, Duration::from_secs(300));
    }

    #[test]
    fn test_without_session_file() {
        let config = ClientConfig::new(Url::parse("http://localhost:8080").expect("url"))
            .without_session_file();
        assert!(config.session_file.is_none());
    }
}
