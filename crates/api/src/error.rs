//! Failures reported by the Cordra client.

use std::error::Error as _;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors surfaced by [`crate::CordraClient`].
///
/// `Status` always carries the HTTP status the repository answered with;
/// `Unavailable` never does, because no response was received.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("repository returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("repository unreachable: {message}")]
    Unavailable { message: String, timed_out: bool },

    #[error("malformed repository response: {message}")]
    Decode { message: String },

    #[error("invalid client configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl ApiError {
    /// HTTP status reported by the repository, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            message: extract_error_message(status, body),
        }
    }

    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        let error = error.without_url();
        let detail = redact_sensitive(&error_chain(&error));
        debug!(detail = %detail, "repository request failed");

        if error.is_decode() {
            return ApiError::Decode {
                message: "response body could not be decoded".to_string(),
            };
        }
        let timed_out = error.is_timeout();
        let message = if timed_out {
            "request timed out"
        } else if is_tls_failure(&detail) {
            "TLS handshake failed"
        } else if error.is_connect() {
            "could not connect to repository"
        } else {
            "request to repository failed"
        };
        ApiError::Unavailable {
            message: message.to_string(),
            timed_out,
        }
    }
}

/// Render an error with its sources, e.g. `error sending request: connection refused`.
///
/// Only for logs; callers see the stable messages chosen in `from_transport`.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

fn is_tls_failure(detail: &str) -> bool {
    let detail = detail.to_ascii_lowercase();
    ["certificate", "tls", "ssl", "handshake"].iter().any(|needle| detail.contains(needle))
}

/// Pull a human-readable message out of an error response body.
///
/// Cordra answers failures with `{"message": "..."}`. Other bodies fall back to
/// their trimmed text, and empty bodies to the status reason phrase.
pub(crate) fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|field| field.as_str())
                && !text.trim().is_empty()
            {
                return redact_sensitive(text.trim());
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status.canonical_reason().unwrap_or("unknown error").to_string();
    }
    redact_sensitive(&truncate(trimmed, MAX_ERROR_BODY_CHARS))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s*)(\S+(?:\s+\S+)?)",
        r"(?i)(password=)([^\s&]+)",
        r"(?i)(https?://)([^/@\s]+@)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Strip credential-looking fragments from text that may reach callers.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}<redacted>")
            })
            .to_string();
    }
    redacted
}
