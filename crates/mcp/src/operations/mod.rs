//! Read-only repository operations.
//!
//! Each operation validates its input, issues one `GET` against Cordra, and
//! reshapes the answer through [`crate::normalize`]. Handlers hold no mutable
//! state, so a single [`RepositoryOperations`] can be shared across sessions.

mod search;

use cordra_api::{CordraClient, object_path, schema_path};
use cordra_types::{DesignObject, ObjectAcl, PayloadDescriptor, RepositoryObject, SchemaDefinition, SearchPage, ServerInfo};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::CordraConfig;
use crate::normalize::{
    normalize_acl, normalize_design_object, normalize_object, normalize_payloads, normalize_schema, normalize_schema_names,
    normalize_search_page, normalize_server_info,
};
use crate::types::AdapterError;

pub use search::{DEFAULT_PAGE_SIZE, PreparedSearch, SearchRequest, compose_query, prepare_search};

const SCHEMAS_PATH: &str = "/schemas";
const SERVER_INFO_PATH: &str = "/versionInfo";
const DESIGN_OBJECT_ID: &str = "design";

/// Shared, immutable handler set backed by one Cordra client.
#[derive(Debug, Clone)]
pub struct RepositoryOperations {
    client: CordraClient,
    max_search_results: u64,
}

impl RepositoryOperations {
    pub fn new(client: CordraClient, max_search_results: u64) -> Self {
        Self {
            client,
            max_search_results,
        }
    }

    /// Build the client described by `config`.
    pub fn from_config(config: &CordraConfig) -> Result<Self, AdapterError> {
        let client = CordraClient::new(config.client_settings())?;
        Ok(Self::new(client, config.max_search_results))
    }

    /// Fetch one object with content, metadata, ACL and payload descriptors.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_object(&self, id: &str) -> Result<RepositoryObject, AdapterError> {
        let id = validate_object_id(id)?;
        let raw = self.fetch_full_object(id).await?;
        normalize_object(Some(id), raw)
    }

    /// Run a search and return one page of normalized objects.
    #[instrument(skip(self), level = "debug")]
    pub async fn search_objects(&self, request: SearchRequest) -> Result<SearchPage, AdapterError> {
        let prepared = prepare_search(request, self.max_search_results)?;
        debug!(query = %prepared.query, page_num = prepared.window.page_num, page_size = prepared.window.page_size, "searching objects");

        let raw = self
            .client
            .get_json("/search", &prepared.query_pairs())
            .await
            .map_err(|error| AdapterError::from_api(error, "search"))?;
        normalize_search_page(raw, prepared.window, prepared.type_filter.as_deref())
    }

    /// Names of all types with a schema, sorted.
    #[instrument(skip(self), level = "debug")]
    pub async fn list_schemas(&self) -> Result<Vec<String>, AdapterError> {
        let raw = self
            .client
            .get_json(SCHEMAS_PATH, &[])
            .await
            .map_err(|error| AdapterError::from_api(error, "schema listing"))?;
        normalize_schema_names(raw)
    }

    /// JSON Schema of one type.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_schema(&self, type_name: &str) -> Result<SchemaDefinition, AdapterError> {
        let type_name = validate_type_name(type_name)?;
        let raw = self
            .client
            .get_json(&schema_path(type_name), &[])
            .await
            .map_err(|error| AdapterError::from_api(error, &format!("schema '{type_name}'")))?;
        normalize_schema(type_name, raw)
    }

    /// Payload descriptors of one object; never the payload bytes.
    #[instrument(skip(self), level = "debug")]
    pub async fn list_payloads(&self, id: &str) -> Result<Vec<PayloadDescriptor>, AdapterError> {
        let object = self.get_object(id).await?;
        Ok(normalize_payloads(&object))
    }

    /// Readers and writers of one object.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_object_acl(&self, id: &str) -> Result<ObjectAcl, AdapterError> {
        let object = self.get_object(id).await?;
        Ok(normalize_acl(&object))
    }

    /// Version and capability metadata of the repository.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_server_info(&self) -> Result<ServerInfo, AdapterError> {
        let raw = self
            .client
            .get_json(SERVER_INFO_PATH, &[])
            .await
            .map_err(|error| AdapterError::from_api(error, "server info"))?;
        normalize_server_info(raw)
    }

    /// The repository's design object.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_design_object(&self) -> Result<DesignObject, AdapterError> {
        let raw = self.fetch_full_object(DESIGN_OBJECT_ID).await?;
        normalize_design_object(raw)
    }

    async fn fetch_full_object(&self, id: &str) -> Result<Value, AdapterError> {
        self.client
            .get_json(&object_path(id), &[("full", "true".to_string())])
            .await
            .map_err(|error| AdapterError::from_api(error, &format!("object '{id}'")))
    }
}

/// Trimmed object identifier, or `BadRequest` when it is not usable as a handle.
pub fn validate_object_id(id: &str) -> Result<&str, AdapterError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AdapterError::bad_request("object id must not be empty"));
    }
    if id.chars().any(char::is_control) {
        return Err(AdapterError::bad_request(format!("object id {id:?} contains control characters")));
    }
    if id.split('/').any(str::is_empty) {
        return Err(AdapterError::bad_request(format!("object id '{id}' has an empty path segment")));
    }
    Ok(id)
}

fn validate_type_name(type_name: &str) -> Result<&str, AdapterError> {
    let type_name = type_name.trim();
    if type_name.is_empty() {
        return Err(AdapterError::bad_request("type name must not be empty"));
    }
    if type_name.chars().any(char::is_control) {
        return Err(AdapterError::bad_request(format!(
            "type name {type_name:?} contains control characters"
        )));
    }
    Ok(type_name)
}
