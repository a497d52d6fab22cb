//! Search parameter validation and query composition.

use crate::normalize::PageWindow;
use crate::types::AdapterError;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 25;

const MATCH_ALL_QUERY: &str = "*:*";

/// Search parameters as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    /// Query in the repository's query language (Lucene for Cordra).
    pub query: Option<String>,
    /// Restrict hits to a single Cordra type.
    pub type_name: Option<String>,
    pub page_num: Option<i64>,
    pub page_size: Option<i64>,
    /// Sort specification passed through verbatim, e.g. `/name ASC`.
    pub sort_fields: Option<String>,
}

/// A search that passed validation, ready to send upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSearch {
    pub query: String,
    pub type_filter: Option<String>,
    pub window: PageWindow,
    pub sort_fields: Option<String>,
}

impl PreparedSearch {
    /// Query-string pairs for `GET /search`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("query", self.query.clone()),
            ("pageNum", self.window.page_num.to_string()),
            ("pageSize", self.window.page_size.to_string()),
            ("full", "true".to_string()),
        ];
        if let Some(sort_fields) = &self.sort_fields {
            pairs.push(("sortFields", sort_fields.clone()));
        }
        pairs
    }
}

/// Validate a search request and clamp its page size to `max_page_size`.
///
/// Negative page coordinates are rejected; oversized pages are clamped, never
/// rejected.
pub fn prepare_search(request: SearchRequest, max_page_size: u64) -> Result<PreparedSearch, AdapterError> {
    let page_num = non_negative("pageNum", request.page_num)?.unwrap_or(0);
    let requested_size = non_negative("pageSize", request.page_size)?.unwrap_or(DEFAULT_PAGE_SIZE);
    let page_size = requested_size.min(max_page_size);

    let query = non_blank(request.query);
    let type_filter = non_blank(request.type_name);
    if let Some(type_name) = &type_filter
        && type_name.chars().any(char::is_control)
    {
        return Err(AdapterError::bad_request("type must not contain control characters"));
    }

    Ok(PreparedSearch {
        query: compose_query(query.as_deref(), type_filter.as_deref()),
        type_filter,
        window: PageWindow { page_num, page_size },
        sort_fields: non_blank(request.sort_fields),
    })
}

/// Combine a free query with a type restriction.
///
/// The query text is passed through untouched; the type is added as a quoted
/// term joined with `AND`.
pub fn compose_query(query: Option<&str>, type_name: Option<&str>) -> String {
    match (query, type_name) {
        (None, None) => MATCH_ALL_QUERY.to_string(),
        (Some(query), None) => query.to_string(),
        (None, Some(type_name)) => type_term(type_name),
        (Some(query), Some(type_name)) => format!("({query}) AND {}", type_term(type_name)),
    }
}

fn type_term(type_name: &str) -> String {
    let escaped = type_name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("type:\"{escaped}\"")
}

fn non_negative(name: &str, value: Option<i64>) -> Result<Option<u64>, AdapterError> {
    match value {
        None => Ok(None),
        Some(value) => u64::try_from(value)
            .map(Some)
            .map_err(|_| AdapterError::bad_request(format!("{name} must be a non-negative integer, got {value}"))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|text| text.trim().to_string()).filter(|text| !text.is_empty())
}
