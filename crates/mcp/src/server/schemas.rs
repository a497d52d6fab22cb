use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::operations::SearchRequest;

/// Parameters for tools addressing a single object.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdParam {
    /// Cordra handle of the object.
    #[schemars(description = "Object identifier (handle), for example 'test/123'.")]
    pub id: String,
}

/// Parameters for schema lookup.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaParam {
    #[serde(rename = "type")]
    #[schemars(description = "Type name whose JSON Schema should be returned. Use list_schemas for valid names.")]
    pub type_name: String,
}

/// Parameters for object search.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SearchObjectsParam {
    /// Lucene query. Omit to match every object.
    #[schemars(description = "Lucene query, for example '/name:John' or 'title:report'. Omit to match all objects.")]
    pub query: Option<String>,
    /// Optional type restriction, combined with the query using AND.
    #[serde(rename = "type")]
    #[schemars(description = "Restrict results to this object type, for example 'Document'.")]
    pub type_name: Option<String>,
    #[schemars(description = "Zero-based page number. Defaults to 0.")]
    pub page_num: Option<i64>,
    /// Requested page size; larger values are clamped to the configured maximum.
    #[schemars(description = "Results per page. Defaults to 25 and is capped at the server's maximum.")]
    pub page_size: Option<i64>,
    #[schemars(description = "Sort specification, for example '/name ASC' or '/metadata/createdOn DESC'.")]
    pub sort_fields: Option<String>,
}

impl From<SearchObjectsParam> for SearchRequest {
    fn from(param: SearchObjectsParam) -> Self {
        SearchRequest {
            query: param.query,
            type_name: param.type_name,
            page_num: param.page_num,
            page_size: param.page_size,
            sort_fields: param.sort_fields,
        }
    }
}
