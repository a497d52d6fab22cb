//! Cordra REST API client.
//!
//! This crate provides a small, read-only client for a Cordra digital-object
//! repository. It focuses on:
//!
//! - Building one pooled HTTP client with a bounded per-request timeout
//! - Attaching basic-auth credentials to every request when configured
//! - Toggling TLS certificate verification
//! - Classifying failures into HTTP-status and network-level errors
//!
//! The primary entry point is [`CordraClient`]. Create one via
//! [`CordraClient::new`] and read JSON with [`CordraClient::get_json`].
//!
//! # Example
//!
//! ```ignore
//! use cordra_api::{ClientSettings, CordraClient};
//!
//! async fn fetch() -> Result<(), cordra_api::ApiError> {
//!     let settings = ClientSettings::new("https://localhost:8443".parse().unwrap());
//!     let client = CordraClient::new(settings)?;
//!     let object = client.get_json(&cordra_api::object_path("test/123"), &[("full", "true".into())]).await?;
//!     println!("{object}");
//!     Ok(())
//! }
//! ```

mod error;

use std::fmt;
use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, header};
use serde_json::Value;
use tracing::debug;
use url::Url;

pub use error::{ApiError, redact_sensitive};

/// Characters left unescaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Username/password pair sent as HTTP basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection settings for [`CordraClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub credentials: Option<Credentials>,
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl ClientSettings {
    /// Settings for an unauthenticated client with TLS verification enabled.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            credentials: None,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Thin wrapper around a configured `reqwest::Client` for Cordra access.
///
/// Cloning is cheap and shares the underlying connection pool, so a single
/// instance can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct CordraClient {
    base_url: String,
    http: Client,
    credentials: Option<Credentials>,
    user_agent: String,
}

impl CordraClient {
    /// Construct a client from explicit settings.
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(!settings.verify_tls)
            .build()
            .map_err(|error| ApiError::InvalidConfiguration {
                message: redact_sensitive(&error.without_url().to_string()),
            })?;

        Ok(Self {
            base_url: settings.base_url.as_str().trim_end_matches('/').to_string(),
            http,
            credentials: settings.credentials,
            user_agent: format!("cordra-mcp/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        })
    }

    /// Base URL requests are resolved against, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a GET request for an API-relative path.
    ///
    /// The resulting request carries the configured User-Agent and basic-auth
    /// credentials. GET is the only verb this client issues.
    pub fn request(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, authenticated = self.credentials.is_some(), "building request");

        let builder = self
            .http
            .request(Method::GET, url)
            .header(header::USER_AGENT, &self.user_agent);
        match &self.credentials {
            Some(credentials) => builder.basic_auth(&credentials.username, Some(&credentials.password)),
            None => builder,
        }
    }

    /// Issue a GET request and decode the JSON response body.
    ///
    /// Non-2xx responses become [`ApiError::Status`]; failures to reach the
    /// repository become [`ApiError::Unavailable`]. Nothing is retried.
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let response = self.request(path).query(query).send().await.map_err(ApiError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from_transport)?;
        debug!(path, status = status.as_u16(), bytes = body.len(), "received response");

        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|error| ApiError::Decode {
            message: format!("expected JSON body: {error}"),
        })
    }
}

/// Percent-encode a handle for use in a URL path, keeping `/` separators.
pub fn encode_handle(handle: &str) -> String {
    handle
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of a single object, e.g. `/objects/test/123`.
pub fn object_path(handle: &str) -> String {
    format!("/objects/{}", encode_handle(handle))
}

/// Path of a single schema, e.g. `/schemas/Document`.
pub fn schema_path(type_name: &str) -> String {
    format!("/schemas/{}", utf8_percent_encode(type_name, PATH_SEGMENT))
}
