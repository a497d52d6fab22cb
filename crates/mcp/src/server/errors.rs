//! Structured protocol error rendering.

use chrono::Utc;
use rmcp::model::ErrorData;
use serde_json::Value;

use crate::types::{AdapterError, ErrorKind};

fn build_error_data(error: &AdapterError, category: &str, context: Value, suggested_action: &str) -> Value {
    let mut payload = serde_json::json!({
        "error_code": error.error_code(),
        "category": category,
        "message": error.message(),
        "context": context,
        "retryable": error.is_retryable(),
        "suggested_action": suggested_action,
        "correlation_id": format!("cordra-{}", Utc::now().timestamp_millis()),
    });
    if let AdapterError::UpstreamError { status: Some(status), .. } = error {
        payload["upstream_status"] = Value::from(*status);
    }
    payload
}

/// Convert an operation failure into an MCP error carrying its stable code.
///
/// Caller mistakes become `invalid_params`, unknown entities become
/// `resource_not_found`, and upstream failures become `internal_error`.
pub fn adapter_error(error: &AdapterError, context: Value) -> ErrorData {
    let message = error.to_string();
    match error.kind() {
        ErrorKind::BadRequest => ErrorData::invalid_params(
            message,
            Some(build_error_data(
                error,
                "validation",
                context,
                "Correct the arguments and retry.",
            )),
        ),
        ErrorKind::NotFound => ErrorData::resource_not_found(
            message,
            Some(build_error_data(
                error,
                "not_found",
                context,
                "Check the identifier or type name. Use search_objects or list_schemas to discover valid values.",
            )),
        ),
        ErrorKind::Forbidden => ErrorData::invalid_request(
            message,
            Some(build_error_data(
                error,
                "authorization",
                context,
                "The configured account cannot read this entity. Do not retry with the same credentials.",
            )),
        ),
        ErrorKind::UpstreamUnavailable => ErrorData::internal_error(
            message,
            Some(build_error_data(
                error,
                "upstream",
                context,
                "The repository could not be reached. Retry later.",
            )),
        ),
        ErrorKind::UpstreamError => ErrorData::internal_error(
            message,
            Some(build_error_data(
                error,
                "upstream",
                context,
                "The repository returned an unexpected response.",
            )),
        ),
    }
}

/// Error for a resource URI that names nothing this server exposes.
pub fn unknown_resource_error(uri: &str) -> ErrorData {
    adapter_error(
        &AdapterError::not_found(format!("no resource matches '{uri}'")),
        serde_json::json!({ "uri": uri }),
    )
}
