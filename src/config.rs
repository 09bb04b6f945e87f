//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local runs.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default Strava host; API and OAuth paths are appended to it.
pub const DEFAULT_STRAVA_BASE_URL: &str = "https://www.strava.com";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Root folder holding the credential file and the `data/` cache
    pub folder_path: PathBuf,
    /// Credential file name, relative to `folder_path`
    pub refresh_token_file_name: String,
    /// Strava host (overridable for tests)
    pub strava_base_url: String,
    /// Bind address for the HTTP surface
    pub host: String,
    /// Server port
    pub port: u16,
    /// Per-request timeout for Strava calls
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: required("STRAVA_CLIENT_ID")?,
            strava_client_secret: required("STRAVA_CLIENT_SECRET")?.trim().to_string(),
            folder_path: PathBuf::from(required("FOLDER_PATH")?),
            refresh_token_file_name: env::var("REFRESH_TOKEN_FILE_NAME")
                .unwrap_or_else(|_| "refresh_token.json".to_string()),
            strava_base_url: env::var("STRAVA_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_STRAVA_BASE_URL.to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8081)?,
            http_timeout: Duration::from_secs(parsed("HTTP_TIMEOUT_SECS", 30)?),
        })
    }

    /// Config for tests, rooted at `folder_path` and talking to `base_url`.
    pub fn test_default(folder_path: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            folder_path: folder_path.into(),
            refresh_token_file_name: "refresh_token.json".to_string(),
            strava_base_url: base_url.trim_end_matches('/').to_string(),
            host: "127.0.0.1".to_string(),
            port: 8081,
            http_timeout: Duration::from_secs(5),
        }
    }

    /// Full path of the persisted credential.
    pub fn credential_path(&self) -> PathBuf {
        self.folder_path.join(&self.refresh_token_file_name)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
