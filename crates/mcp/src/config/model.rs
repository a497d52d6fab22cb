//! Data models for adapter configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use cordra_api::{ClientSettings, Credentials};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://localhost:8443";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_SEARCH_RESULTS: u64 = 1000;

/// Validated, immutable adapter configuration.
///
/// Built once at startup by [`crate::config::load_config`] and shared
/// read-only by every request afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct CordraConfig {
    /// Base URL of the Cordra repository.
    pub base_url: Url,
    /// Username for basic auth. Always paired with `password`.
    pub username: Option<String>,
    /// Password for basic auth. Always paired with `username`.
    pub password: Option<String>,
    /// Whether TLS certificates are verified.
    pub verify_ssl: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Upper bound applied to every search page size.
    pub max_search_results: u64,
    pub log_level: LogLevel,
}

impl Default for CordraConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            username: None,
            password: None,
            verify_ssl: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            log_level: LogLevel::Info,
        }
    }
}

impl CordraConfig {
    /// Settings for the outbound repository client.
    pub fn client_settings(&self) -> ClientSettings {
        let credentials = match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };
        ClientSettings {
            base_url: self.base_url.clone(),
            credentials,
            verify_tls: self.verify_ssl,
            timeout: self.timeout,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

impl fmt::Debug for CordraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CordraConfig")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout", &self.timeout)
            .field("max_search_results", &self.max_search_results)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Unvalidated settings as they appear in the JSON config file.
///
/// Every field is optional; environment variables are layered on top before
/// validation turns the result into a [`CordraConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: Option<bool>,
    /// Request timeout in seconds.
    pub timeout: Option<u64>,
    pub max_search_results: Option<u64>,
    pub log_level: Option<LogLevel>,
}

/// Log verbosity accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(format!(
                "invalid log level '{value}': must be one of DEBUG, INFO, WARNING, ERROR, CRITICAL"
            )),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidEnv { key: String, reason: String },

    #[error("config file {path} does not exist")]
    MissingFile { path: PathBuf },

    #[error("validation error: {0}")]
    Validation(#[from] crate::config::ValidationError),
}
