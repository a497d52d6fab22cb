//! Error taxonomy for adapter operations.

use cordra_api::ApiError;
use thiserror::Error;

/// Failure of a single adapter operation.
///
/// The variant tells callers whether they asked for something invalid
/// (`BadRequest`, `NotFound`), were rejected (`Forbidden`), or whether the
/// repository itself failed (`UpstreamUnavailable`, `UpstreamError`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Access denied: {message}")]
    Forbidden { message: String },

    #[error("Repository unavailable: {message}")]
    UpstreamUnavailable { message: String, timed_out: bool },

    #[error("Repository error: {message}")]
    UpstreamError { status: Option<u16>, message: String },
}

/// Discriminant of [`AdapterError`], useful for assertions and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Forbidden,
    UpstreamUnavailable,
    UpstreamError,
}

impl AdapterError {
    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Create an upstream error for a response that could not be interpreted.
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::UpstreamError {
            status: None,
            message: message.into(),
        }
    }

    /// Classify a client failure, naming the entity the request was about.
    ///
    /// `subject` reads like `object 'test/123'` or `schema 'Document'`.
    pub fn from_api(error: ApiError, subject: &str) -> Self {
        match error {
            ApiError::Status { status, message } => match status {
                400 => Self::BadRequest {
                    message: format!("{subject}: {message}"),
                },
                401 | 403 => Self::Forbidden {
                    message: format!("{subject}: {message}"),
                },
                404 => Self::NotFound {
                    message: format!("{subject} was not found"),
                },
                _ => Self::UpstreamError {
                    status: Some(status),
                    message: format!("{subject}: HTTP {status}: {message}"),
                },
            },
            ApiError::Unavailable { message, timed_out } => Self::UpstreamUnavailable {
                message: format!("{subject}: {message}"),
                timed_out,
            },
            ApiError::Decode { message } => Self::UpstreamError {
                status: None,
                message: format!("{subject}: {message}"),
            },
            ApiError::InvalidConfiguration { message } => Self::UpstreamError { status: None, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::UpstreamError { .. } => ErrorKind::UpstreamError,
        }
    }

    /// Stable, machine-readable code exposed to protocol callers.
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorKind::UpstreamError => "UPSTREAM_ERROR",
        }
    }

    /// Human-readable message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message }
            | Self::NotFound { message }
            | Self::Forbidden { message }
            | Self::UpstreamUnavailable { message, .. }
            | Self::UpstreamError { message, .. } => message,
        }
    }

    /// Whether repeating the same call later might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UpstreamUnavailable { .. } => true,
            Self::UpstreamError { status, .. } => status.is_some_and(|code| code >= 500),
            _ => false,
        }
    }
}

impl From<ApiError> for AdapterError {
    fn from(error: ApiError) -> Self {
        Self::from_api(error, "repository request")
    }
}
