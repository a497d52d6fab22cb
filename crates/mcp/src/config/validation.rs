//! Configuration validation.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::model::{DEFAULT_BASE_URL, DEFAULT_MAX_SEARCH_RESULTS, DEFAULT_TIMEOUT_SECS};
use crate::config::{ConfigFile, CordraConfig, LogLevel};

/// Validate layered settings and apply defaults for anything left unset.
pub fn validate_config(file: &ConfigFile) -> Result<CordraConfig, ValidationError> {
    let base_url = validate_base_url(file.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
    let (username, password) = validate_credentials(file.username.as_deref(), file.password.as_deref())?;

    let timeout_secs = file.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ValidationError::OutOfRange {
            field: "timeout".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }

    let max_search_results = file.max_search_results.unwrap_or(DEFAULT_MAX_SEARCH_RESULTS);
    if max_search_results == 0 {
        return Err(ValidationError::OutOfRange {
            field: "maxSearchResults".to_string(),
            reason: "maximum search page size must be positive".to_string(),
        });
    }

    let config = CordraConfig {
        base_url,
        username,
        password,
        verify_ssl: file.verify_ssl.unwrap_or(true),
        timeout: Duration::from_secs(timeout_secs),
        max_search_results,
        log_level: file.log_level.unwrap_or(LogLevel::Info),
    };
    debug!(base_url = %config.base_url, authenticated = config.is_authenticated(), "validated configuration");
    Ok(config)
}

/// Validate the repository base URL.
fn validate_base_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw.trim()).map_err(|error| ValidationError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: error.to_string(),
    })?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ValidationError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported URL scheme: {scheme} (expected http/https)"),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL must include a host".to_string(),
        });
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ValidationError::InvalidBaseUrl {
            url: url.host_str().unwrap_or_default().to_string(),
            reason: "credentials belong in username/password, not the URL".to_string(),
        });
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL must not carry a query or fragment".to_string(),
        });
    }

    Ok(url)
}

fn validate_credentials(username: Option<&str>, password: Option<&str>) -> Result<(Option<String>, Option<String>), ValidationError> {
    let username = username.map(str::trim).filter(|value| !value.is_empty());
    let password = password.filter(|value| !value.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok((Some(username.to_string()), Some(password.to_string()))),
        (None, None) => Ok((None, None)),
        (Some(_), None) => Err(ValidationError::IncompleteCredentials {
            missing: "password".to_string(),
        }),
        (None, Some(_)) => Err(ValidationError::IncompleteCredentials {
            missing: "username".to_string(),
        }),
    }
}

/// Errors that can occur during validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("credentials are incomplete: {missing} is missing")]
    IncompleteCredentials { missing: String },

    #[error("invalid {field}: {reason}")]
    OutOfRange { field: String, reason: String },
}
