//! Configuration loading from files and environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use tracing::debug;

use crate::config::{ConfigError, ConfigFile, CordraConfig, LogLevel, validate_config};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CORDRA_CONFIG_PATH";

const BASE_URL_ENV: &str = "CORDRA_BASE_URL";
const USERNAME_ENV: &str = "CORDRA_USERNAME";
const PASSWORD_ENV: &str = "CORDRA_PASSWORD";
const VERIFY_SSL_ENV: &str = "CORDRA_VERIFY_SSL";
const TIMEOUT_ENV: &str = "CORDRA_TIMEOUT";
const MAX_SEARCH_RESULTS_ENV: &str = "CORDRA_MAX_SEARCH_RESULTS";
const LOG_LEVEL_ENV: &str = "CORDRA_LOG_LEVEL";
const LOG_LEVEL_ALIAS_ENV: &str = "LOGLEVEL";

/// Returns the default path for the config file.
pub fn default_config_path() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cordra-mcp")
        .join("config.json")
}

/// Load configuration once at startup.
///
/// An explicit path (or `CORDRA_CONFIG_PATH`) must exist. The default path is
/// optional: when it is absent, settings come from the environment alone.
pub fn load_config(explicit_path: Option<&Path>) -> Result<CordraConfig, ConfigError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return load_config_from_path(Path::new(path.trim()));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        return load_config_from_path(&default_path);
    }

    let mut file = ConfigFile::default();
    apply_env_overrides(&mut file)?;
    Ok(validate_config(&file)?)
}

/// Load configuration from a specific file, layering environment variables on top.
pub fn load_config_from_path(path: &Path) -> Result<CordraConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile { path: path.to_path_buf() });
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut file: ConfigFile = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config file");

    apply_env_overrides(&mut file)?;
    Ok(validate_config(&file)?)
}

/// Overwrite file settings with any `CORDRA_*` variables that are set.
fn apply_env_overrides(file: &mut ConfigFile) -> Result<(), ConfigError> {
    if let Some(value) = read_env(BASE_URL_ENV) {
        file.base_url = Some(value);
    }
    if let Some(value) = read_env(USERNAME_ENV) {
        file.username = Some(value);
    }
    if let Some(value) = read_env(PASSWORD_ENV) {
        file.password = Some(value);
    }
    if let Some(value) = read_env(VERIFY_SSL_ENV) {
        file.verify_ssl = Some(parse_bool(VERIFY_SSL_ENV, &value)?);
    }
    if let Some(value) = read_env(TIMEOUT_ENV) {
        file.timeout = Some(parse_unsigned(TIMEOUT_ENV, &value)?);
    }
    if let Some(value) = read_env(MAX_SEARCH_RESULTS_ENV) {
        file.max_search_results = Some(parse_unsigned(MAX_SEARCH_RESULTS_ENV, &value)?);
    }
    if let Some((key, value)) = read_env(LOG_LEVEL_ENV)
        .map(|value| (LOG_LEVEL_ENV, value))
        .or_else(|| read_env(LOG_LEVEL_ALIAS_ENV).map(|value| (LOG_LEVEL_ALIAS_ENV, value)))
    {
        let level = value.parse::<LogLevel>().map_err(|reason| ConfigError::InvalidEnv {
            key: key.to_string(),
            reason,
        })?;
        file.log_level = Some(level);
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key: key.to_string(),
            reason: format!("'{value}' is not a boolean"),
        }),
    }
}

fn parse_unsigned(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        reason: format!("'{value}' is not a non-negative integer"),
    })
}
