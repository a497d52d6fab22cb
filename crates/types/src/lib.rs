//! Entity shapes exchanged between the Cordra repository and MCP callers.
//!
//! Every type here is transient: it is built from a single upstream response,
//! serialized into a tool or resource result, and dropped. Nothing is cached
//! across calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Cordra digital object as returned to MCP callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryObject {
    /// Handle of the object in `prefix/suffix` form.
    pub id: String,
    /// Name of the schema (Cordra type) the content conforms to.
    #[serde(rename = "type")]
    pub type_name: String,
    /// JSON content of the object.
    pub content: Value,
    /// Repository-maintained metadata (creation/modification stamps, creator, ...).
    pub metadata: Option<Value>,
    /// Access control list, when the repository exposes one.
    pub acl: Option<ObjectAcl>,
    /// Attached payload descriptors. Never carries payload bytes.
    pub payloads: Option<Vec<PayloadDescriptor>>,
}

/// Metadata describing a binary payload attached to an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadDescriptor {
    /// Payload name, unique within its object.
    pub name: String,
    /// Size of the payload in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Media type of the payload (Cordra calls this `mediaType`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Readers and writers granted on an object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectAcl {
    pub readers: Vec<String>,
    pub writers: Vec<String>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<RepositoryObject>,
    /// Number of objects matching the query across all pages.
    pub total_count: u64,
    pub page_num: u64,
    /// Effective page size after clamping to the configured maximum.
    pub page_size: u64,
}

/// JSON Schema body of a Cordra type, including Cordra-specific extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(rename = "type")]
    pub type_name: String,
    pub schema: Value,
}

/// The repository-wide design object (handle minting, authorization, UI flags).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignObject {
    pub id: String,
    pub content: Value,
}

/// Version and capability metadata reported by the repository.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Remaining fields (build metadata, capability flags) as reported upstream.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl RepositoryObject {
    /// Payload descriptors, or an empty slice when the object has none.
    pub fn payload_descriptors(&self) -> &[PayloadDescriptor] {
        self.payloads.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repository_object_serializes_type_field() {
        let object = RepositoryObject {
            id: "test/123".to_string(),
            type_name: "Document".to_string(),
            content: json!({ "id": "test/123", "title": "Report" }),
            metadata: None,
            acl: None,
            payloads: None,
        };

        let value = serde_json::to_value(&object).expect("serialize object");
        assert_eq!(value["id"], json!("test/123"));
        assert_eq!(value["type"], json!("Document"));
        assert_eq!(value["payloads"], Value::Null);
        assert!(value.get("type_name").is_none());
    }

    #[test]
    fn payload_descriptor_uses_content_type_key() {
        let descriptor = PayloadDescriptor {
            name: "file.pdf".to_string(),
            size: Some(2048),
            content_type: Some("application/pdf".to_string()),
        };

        let value = serde_json::to_value(&descriptor).expect("serialize descriptor");
        assert_eq!(value, json!({ "name": "file.pdf", "size": 2048, "contentType": "application/pdf" }));
    }

    #[test]
    fn search_page_uses_camel_case_keys() {
        let page = SearchPage {
            results: Vec::new(),
            total_count: 42,
            page_num: 1,
            page_size: 1000,
        };

        let value = serde_json::to_value(&page).expect("serialize page");
        assert_eq!(value["totalCount"], json!(42));
        assert_eq!(value["pageNum"], json!(1));
        assert_eq!(value["pageSize"], json!(1000));
    }

    #[test]
    fn server_info_flattens_details() {
        let info: ServerInfo = serde_json::from_value(json!({
            "version": "2.5.2",
            "buildDate": "2024-01-01"
        }))
        .expect("deserialize server info");

        assert_eq!(info.version.as_deref(), Some("2.5.2"));
        assert_eq!(info.details.get("buildDate"), Some(&json!("2024-01-01")));
    }
}
