//! Repository resources: schema listing, object pages, the design object, and
//! per-type schemas discovered from the live repository.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use rmcp::model::{
    AnnotateAble, ErrorData, ListResourceTemplatesResult, ListResourcesResult, RawResource, RawResourceTemplate, ReadResourceResult,
    ResourceContents,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::operations::{RepositoryOperations, SearchRequest};
use crate::server::errors::{adapter_error, unknown_resource_error};
use crate::types::AdapterError;

pub const SCHEMAS_URI: &str = "cordra://schemas/";
pub const OBJECTS_URI: &str = "cordra://objects/";
pub const DESIGN_OBJECT_URI: &str = "cordra://design_object/";

const JSON_MIME_TYPE: &str = "application/json";

/// RFC 3986 unreserved characters stay literal in a URI segment.
const URI_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// What a resource URI points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceTarget {
    SchemaIndex,
    ObjectIndex,
    DesignObject,
    Schema(String),
    Object(String),
}

/// Map a `cordra://` URI onto a resource target.
///
/// Path segments are percent-decoded; object identifiers keep their `/`.
pub fn parse_resource_uri(uri: &str) -> Result<ResourceTarget, AdapterError> {
    match uri {
        SCHEMAS_URI => return Ok(ResourceTarget::SchemaIndex),
        OBJECTS_URI => return Ok(ResourceTarget::ObjectIndex),
        DESIGN_OBJECT_URI => return Ok(ResourceTarget::DesignObject),
        _ => {}
    }

    if let Some(type_name) = uri.strip_prefix(SCHEMAS_URI) {
        let type_name = decode_segment(uri, type_name)?;
        if type_name.contains('/') {
            return Err(AdapterError::not_found(format!("no resource matches '{uri}'")));
        }
        return Ok(ResourceTarget::Schema(type_name));
    }
    if let Some(object_id) = uri.strip_prefix(OBJECTS_URI) {
        return Ok(ResourceTarget::Object(decode_segment(uri, object_id)?));
    }
    Err(AdapterError::not_found(format!("no resource matches '{uri}'")))
}

/// Resource URI of one type's schema, with the type name percent-encoded.
pub fn schema_resource_uri(type_name: &str) -> String {
    format!("{SCHEMAS_URI}{}", utf8_percent_encode(type_name, URI_SEGMENT))
}

/// Static resources plus one entry per schema the repository currently reports.
///
/// Schema discovery failures are logged and leave the static entries intact.
pub async fn list_resources(operations: &RepositoryOperations) -> ListResourcesResult {
    let mut resources = vec![
        resource(
            SCHEMAS_URI,
            "cordra-schemas",
            Some("Cordra schemas"),
            Some("Names of all object types that have a schema"),
        ),
        resource(
            OBJECTS_URI,
            "cordra-objects",
            Some("Cordra objects"),
            Some("First page of objects in the repository"),
        ),
        resource(
            DESIGN_OBJECT_URI,
            "cordra-design-object",
            Some("Cordra design object"),
            Some("Repository-wide configuration: type registry, UI and handle settings"),
        ),
    ];

    match operations.list_schemas().await {
        Ok(type_names) => {
            debug!(count = type_names.len(), "discovered schema resources");
            resources.extend(type_names.iter().map(|type_name| {
                resource(
                    &schema_resource_uri(type_name),
                    &format!("cordra-type-schema-{type_name}"),
                    Some(&format!("{type_name} schema")),
                    Some(&format!("JSON schema for Cordra type {type_name}")),
                )
            }));
        }
        Err(error) => warn!(error = %error, "failed to discover schema resources"),
    }

    ListResourcesResult::with_all_items(resources)
}

/// Resource templates for parameterized reads.
pub fn list_resource_templates() -> ListResourceTemplatesResult {
    let templates = vec![
        RawResourceTemplate {
            uri_template: "cordra://schemas/{type_name}".to_string(),
            name: "cordra-type-schema".to_string(),
            title: Some("Cordra schema by type".to_string()),
            description: Some("JSON schema of a single Cordra type.".to_string()),
            mime_type: Some(JSON_MIME_TYPE.to_string()),
            icons: None,
        }
        .no_annotation(),
        RawResourceTemplate {
            uri_template: "cordra://objects/{object_id}".to_string(),
            name: "cordra-object".to_string(),
            title: Some("Cordra object by id".to_string()),
            description: Some("A digital object with content, metadata, ACL and payload descriptors.".to_string()),
            mime_type: Some(JSON_MIME_TYPE.to_string()),
            icons: None,
        }
        .no_annotation(),
    ];
    ListResourceTemplatesResult::with_all_items(templates)
}

/// Read one resource and render it as pretty-printed JSON text.
pub async fn read_resource(uri: &str, operations: &RepositoryOperations) -> Result<ReadResourceResult, ErrorData> {
    let target = parse_resource_uri(uri).map_err(|error| match error {
        AdapterError::NotFound { .. } => unknown_resource_error(uri),
        other => adapter_error(&other, serde_json::json!({ "uri": uri })),
    })?;
    let text = match target {
        ResourceTarget::SchemaIndex => render(uri, operations.list_schemas().await),
        ResourceTarget::ObjectIndex => render(uri, operations.search_objects(SearchRequest::default()).await),
        ResourceTarget::DesignObject => render(uri, operations.get_design_object().await),
        ResourceTarget::Schema(type_name) => render(uri, operations.get_schema(&type_name).await),
        ResourceTarget::Object(object_id) => render(uri, operations.get_object(&object_id).await),
    }
    .map_err(|error| adapter_error(&error, serde_json::json!({ "uri": uri })))?;

    Ok(text_resource(uri, text))
}

fn render<T: Serialize>(uri: &str, outcome: Result<T, AdapterError>) -> Result<String, AdapterError> {
    let entity = outcome?;
    serde_json::to_string_pretty(&entity)
        .map_err(|error| AdapterError::malformed_response(format!("failed to render resource '{uri}': {error}")))
}

fn decode_segment(uri: &str, raw: &str) -> Result<String, AdapterError> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| AdapterError::bad_request(format!("resource URI '{uri}' is not valid UTF-8 after decoding")))?;
    if decoded.trim().is_empty() {
        return Err(AdapterError::bad_request(format!("resource URI '{uri}' is missing an identifier")));
    }
    Ok(decoded.into_owned())
}

fn resource(uri: &str, name: &str, title: Option<&str>, description: Option<&str>) -> rmcp::model::Resource {
    RawResource {
        uri: uri.to_string(),
        name: name.to_string(),
        title: title.map(ToString::to_string),
        description: description.map(ToString::to_string),
        mime_type: Some(JSON_MIME_TYPE.to_string()),
        size: None,
        icons: None,
        meta: None,
    }
    .no_annotation()
}

fn text_resource(uri: &str, text: String) -> ReadResourceResult {
    ReadResourceResult {
        contents: vec![ResourceContents::TextResourceContents {
            uri: uri.to_string(),
            mime_type: Some(JSON_MIME_TYPE.to_string()),
            text,
            meta: None,
        }],
    }
}
