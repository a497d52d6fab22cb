//! Search page reshaping.

use cordra_types::{RepositoryObject, SearchPage};
use serde_json::Value;
use tracing::debug;

use crate::normalize::normalize_object;
use crate::types::AdapterError;

/// Page coordinates the caller asked for, after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_num: u64,
    pub page_size: u64,
}

/// Reshape `GET /search` output into `{results, totalCount, pageNum, pageSize}`.
///
/// The reported page size is the clamped one the adapter requested, and the
/// page never holds more results than that. When `type_filter` is set, hits of
/// any other type are dropped.
pub fn normalize_search_page(value: Value, window: PageWindow, type_filter: Option<&str>) -> Result<SearchPage, AdapterError> {
    let Value::Object(mut fields) = value else {
        return Err(AdapterError::malformed_response("search response is not a JSON object"));
    };
    let Some(Value::Array(hits)) = fields.remove("results") else {
        return Err(AdapterError::malformed_response("search response has no results array"));
    };

    let hit_count = hits.len();
    let mut results = hits
        .into_iter()
        .map(|hit| normalize_object(None, hit))
        .collect::<Result<Vec<RepositoryObject>, AdapterError>>()?;

    if let Some(type_name) = type_filter {
        results.retain(|object| object.type_name == type_name);
    }
    results.truncate(usize::try_from(window.page_size).unwrap_or(usize::MAX));
    if results.len() != hit_count {
        debug!(hits = hit_count, kept = results.len(), "trimmed search page");
    }

    let total_count = fields
        .get("size")
        .or_else(|| fields.get("totalCount"))
        .and_then(Value::as_u64)
        .unwrap_or(results.len() as u64);

    Ok(SearchPage {
        results,
        total_count,
        page_num: window.page_num,
        page_size: window.page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(id: &str, type_name: &str) -> Value {
        json!({ "id": id, "type": type_name, "content": { "name": id } })
    }

    #[test]
    fn reshapes_cordra_search_response() {
        let response = json!({
            "pageNum": 0,
            "pageSize": 2,
            "size": 7,
            "results": [hit("test/1", "Document"), hit("test/2", "Document")]
        });

        let page = normalize_search_page(response, PageWindow { page_num: 0, page_size: 2 }, None).expect("page");
        assert_eq!(page.total_count, 7);
        assert_eq!(page.page_num, 0);
        assert_eq!(page.page_size, 2);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].id, "test/1");
    }

    #[test]
    fn never_returns_more_than_page_size() {
        let results = (0..5).map(|n| hit(&format!("test/{n}"), "Document")).collect::<Vec<Value>>();
        let response = json!({ "size": 5, "results": results });

        let page = normalize_search_page(response, PageWindow { page_num: 0, page_size: 3 }, None).expect("page");
        assert_eq!(page.results.len(), 3);
        assert_eq!(page.total_count, 5);
    }

    #[test]
    fn type_filter_drops_other_types() {
        let response = json!({
            "size": 2,
            "results": [hit("test/1", "Document"), hit("test/2", "Person")]
        });

        let page = normalize_search_page(response, PageWindow { page_num: 0, page_size: 10 }, Some("Document")).expect("page");
        assert!(page.results.iter().all(|object| object.type_name == "Document"));
        assert_eq!(page.results.len(), 1);
    }

    #[test]
    fn missing_results_is_malformed() {
        let error = normalize_search_page(json!({ "size": 0 }), PageWindow { page_num: 0, page_size: 10 }, None).unwrap_err();
        assert_eq!(error.error_code(), "UPSTREAM_ERROR");
    }
}
