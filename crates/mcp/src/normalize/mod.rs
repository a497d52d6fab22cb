//! Reshapes raw Cordra JSON into the entities returned to MCP callers.
//!
//! Every function here is pure. Inputs are upstream response bodies, outputs
//! are `cordra-types` entities or an [`AdapterError::UpstreamError`] when the
//! body does not have the expected shape.

mod search;

use cordra_types::{DesignObject, ObjectAcl, PayloadDescriptor, RepositoryObject, SchemaDefinition, ServerInfo};
use serde_json::{Map, Value};

use crate::types::AdapterError;

pub use search::{PageWindow, normalize_search_page};

/// Metadata keys that only matter to the repository's own bookkeeping.
const INTERNAL_METADATA_KEYS: &[&str] = &["txnId"];

const DESIGN_OBJECT_ID: &str = "design";

/// Normalize a full Cordra object (`GET /objects/{id}?full=true` or a search hit).
///
/// When `requested_id` is given it becomes the object's `id`, so a lookup always
/// reports the identifier the caller asked for.
pub fn normalize_object(requested_id: Option<&str>, value: Value) -> Result<RepositoryObject, AdapterError> {
    let Value::Object(mut fields) = value else {
        return Err(AdapterError::malformed_response("object response is not a JSON object"));
    };

    let id = match requested_id {
        Some(id) => id.to_string(),
        None => fields
            .get("id")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| AdapterError::malformed_response("object response has no id"))?,
    };
    let type_name = fields.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
    let content = match fields.remove("content") {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(content) => content,
    };
    let metadata = fields.remove("metadata").and_then(strip_internal_metadata);
    let acl = fields.get("acl").filter(|acl| !acl.is_null()).map(acl_from_value);
    let payloads = match fields.get("payloads") {
        Some(Value::Array(entries)) => Some(entries.iter().filter_map(payload_descriptor).collect()),
        _ => None,
    };

    Ok(RepositoryObject {
        id,
        type_name,
        content,
        metadata,
        acl,
        payloads,
    })
}

/// Payload metadata of an object. Bytes are never part of the output.
pub fn normalize_payloads(object: &RepositoryObject) -> Vec<PayloadDescriptor> {
    object.payload_descriptors().to_vec()
}

/// Readers and writers of an object; absent lists are reported as empty.
pub fn normalize_acl(object: &RepositoryObject) -> ObjectAcl {
    object.acl.clone().unwrap_or_default()
}

/// Type names from `GET /schemas`, sorted and de-duplicated.
///
/// Cordra answers with a map of type name to schema; an array of schema
/// objects (`content.name`) or plain names is accepted as well.
pub fn normalize_schema_names(value: Value) -> Result<Vec<String>, AdapterError> {
    let mut names = match value {
        Value::Object(schemas) => schemas.into_iter().map(|(name, _)| name).collect::<Vec<String>>(),
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) => Some(name.clone()),
                other => other
                    .pointer("/content/name")
                    .or_else(|| other.get("name"))
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
            })
            .collect(),
        _ => return Err(AdapterError::malformed_response("schema listing is neither an object nor an array")),
    };
    names.retain(|name| !name.trim().is_empty());
    names.sort();
    names.dedup();
    Ok(names)
}

/// Schema body for one type. An empty answer means the type is unknown.
pub fn normalize_schema(type_name: &str, value: Value) -> Result<SchemaDefinition, AdapterError> {
    let is_empty = match &value {
        Value::Null => true,
        Value::Object(body) => body.is_empty(),
        _ => {
            return Err(AdapterError::malformed_response(format!(
                "schema '{type_name}' is not a JSON object"
            )));
        }
    };
    if is_empty {
        return Err(AdapterError::not_found(format!("schema '{type_name}' was not found")));
    }

    Ok(SchemaDefinition {
        type_name: type_name.to_string(),
        schema: value,
    })
}

/// The design object, accepting either the full object or its bare content.
pub fn normalize_design_object(value: Value) -> Result<DesignObject, AdapterError> {
    let Value::Object(mut fields) = value else {
        return Err(AdapterError::malformed_response("design object is not a JSON object"));
    };

    if let Some(content) = fields.remove("content") {
        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(DESIGN_OBJECT_ID)
            .to_string();
        return Ok(DesignObject { id, content });
    }

    Ok(DesignObject {
        id: DESIGN_OBJECT_ID.to_string(),
        content: Value::Object(fields),
    })
}

/// Version and capability metadata, passed through with `version` lifted out.
pub fn normalize_server_info(value: Value) -> Result<ServerInfo, AdapterError> {
    let Value::Object(mut details) = value else {
        return Err(AdapterError::malformed_response("server info is not a JSON object"));
    };
    let version = match details.remove("version") {
        Some(Value::String(version)) => Some(version),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };
    Ok(ServerInfo { version, details })
}

fn strip_internal_metadata(metadata: Value) -> Option<Value> {
    match metadata {
        Value::Null => None,
        Value::Object(mut fields) => {
            for key in INTERNAL_METADATA_KEYS {
                fields.remove(*key);
            }
            Some(Value::Object(fields))
        }
        other => Some(other),
    }
}

fn acl_from_value(acl: &Value) -> ObjectAcl {
    ObjectAcl {
        readers: string_list(acl.get("readers")),
        writers: string_list(acl.get("writers")),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(Value::as_str).map(ToString::to_string).collect())
        .unwrap_or_default()
}

fn payload_descriptor(entry: &Value) -> Option<PayloadDescriptor> {
    let name = entry
        .get("name")
        .or_else(|| entry.get("filename"))
        .and_then(Value::as_str)?
        .to_string();
    let size = entry.get("size").and_then(|size| match size {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    });
    let content_type = entry
        .get("mediaType")
        .or_else(|| entry.get("contentType"))
        .and_then(Value::as_str)
        .map(ToString::to_string);

    Some(PayloadDescriptor { name, size, content_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use serde_json::json;

    fn cordra_document() -> Value {
        json!({
            "id": "test/123",
            "type": "Document",
            "content": { "id": "test/123", "title": "Quarterly report" },
            "acl": { "readers": ["public", "team/1"], "writers": ["admin"] },
            "metadata": { "createdOn": 1700000000000u64, "txnId": 987654321u64 },
            "payloads": [
                { "name": "file.pdf", "filename": "report.pdf", "size": 2048, "mediaType": "application/pdf" }
            ]
        })
    }

    #[test]
    fn object_keeps_requested_id_and_type() {
        let object = normalize_object(Some("test/123"), cordra_document()).expect("object normalizes");
        assert_eq!(object.id, "test/123");
        assert_eq!(object.type_name, "Document");
        assert_eq!(object.content["id"], json!("test/123"));
    }

    #[test]
    fn object_metadata_drops_internal_fields() {
        let object = normalize_object(Some("test/123"), cordra_document()).expect("object normalizes");
        let metadata = object.metadata.expect("metadata present");
        assert!(metadata.get("txnId").is_none());
        assert_eq!(metadata["createdOn"], json!(1700000000000u64));
    }

    #[test]
    fn minimal_object_has_empty_content_and_no_optional_parts() {
        let object = normalize_object(None, json!({ "id": "test/minimal" })).expect("object normalizes");
        assert_eq!(object.type_name, "");
        assert_eq!(object.content, json!({}));
        assert!(object.metadata.is_none());
        assert!(object.acl.is_none());
        assert!(object.payloads.is_none());
    }

    #[test]
    fn object_without_id_is_malformed() {
        let error = normalize_object(None, json!({ "type": "Document" })).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UpstreamError);
    }

    #[test]
    fn payloads_are_metadata_only() {
        let mut document = cordra_document();
        document["payloads"][0]["bytes"] = json!("JVBERi0xLjQK");
        let object = normalize_object(Some("test/123"), document).expect("object normalizes");

        let payloads = serde_json::to_value(normalize_payloads(&object)).expect("serialize payloads");
        assert_eq!(
            payloads,
            json!([{ "name": "file.pdf", "size": 2048, "contentType": "application/pdf" }])
        );
    }

    #[test]
    fn acl_lists_match_source() {
        let object = normalize_object(Some("test/123"), cordra_document()).expect("object normalizes");
        let acl = normalize_acl(&object);
        assert_eq!(acl.readers, vec!["public".to_string(), "team/1".to_string()]);
        assert_eq!(acl.writers, vec!["admin".to_string()]);

        let bare = normalize_object(Some("test/bare"), json!({ "type": "Document" })).expect("object normalizes");
        assert_eq!(normalize_acl(&bare), ObjectAcl::default());
    }

    #[test]
    fn schema_names_from_map_are_sorted() {
        let names = normalize_schema_names(json!({ "User": {}, "Document": {}, "Schema": {} })).expect("names");
        assert_eq!(names, vec!["Document", "Schema", "User"]);
    }

    #[test]
    fn schema_names_from_schema_objects_skip_unnamed_entries() {
        let names = normalize_schema_names(json!([
            { "id": "test/user-schema", "content": { "name": "User" } },
            { "id": "test/no-name", "content": {} },
            { "id": "test/project-schema", "content": { "name": "Project" } }
        ]))
        .expect("names");
        assert_eq!(names, vec!["Project", "User"]);
    }

    #[test]
    fn empty_schema_body_is_not_found() {
        let error = normalize_schema("NoSuchType", Value::Null).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);

        let error = normalize_schema("NoSuchType", json!({})).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn schema_body_passes_through() {
        let body = json!({ "type": "object", "properties": { "name": { "type": "string", "cordra": { "preview": { "showInPreview": true } } } } });
        let schema = normalize_schema("User", body.clone()).expect("schema normalizes");
        assert_eq!(schema.type_name, "User");
        assert_eq!(schema.schema, body);
    }

    #[test]
    fn design_object_accepts_full_object_and_bare_content() {
        let full = normalize_design_object(json!({ "id": "design", "type": "CordraDesign", "content": { "handleMintingConfig": { "prefix": "test" } } }))
            .expect("design normalizes");
        assert_eq!(full.id, "design");
        assert_eq!(full.content["handleMintingConfig"]["prefix"], json!("test"));

        let bare = normalize_design_object(json!({ "uiConfig": { "title": "Repo" } })).expect("design normalizes");
        assert_eq!(bare.id, "design");
        assert_eq!(bare.content["uiConfig"]["title"], json!("Repo"));
    }

    #[test]
    fn server_info_lifts_version() {
        let info = normalize_server_info(json!({ "version": "2.5.2", "gitCommit": "abc123" })).expect("info normalizes");
        assert_eq!(info.version.as_deref(), Some("2.5.2"));
        assert_eq!(info.details.get("gitCommit"), Some(&json!("abc123")));
        assert!(info.details.get("version").is_none());
    }
}
