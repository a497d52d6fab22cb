use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, ErrorData, ErrorData as McpError, Implementation, ListResourceTemplatesResult, ListResourcesResult,
    PaginatedRequestParams, ProtocolVersion, ReadResourceRequestParams, ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::{ServerHandler, service::RequestContext, tool, tool_handler, tool_router};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::operations::RepositoryOperations;
use crate::server::errors::adapter_error;
use crate::server::resources::{list_resource_templates, list_resources, read_resource};
use crate::server::schemas::{ObjectIdParam, SchemaParam, SearchObjectsParam};
use crate::types::AdapterError;

const SERVER_INSTRUCTIONS: &str = "READ-ONLY CORDRA REPOSITORY.\nDISCOVERY:\n1) Call list_schemas to learn which object types exist.\n2) Call get_schema for a type to learn its fields.\n3) Call search_objects with a Lucene query and/or type filter; page with pageNum/pageSize.\nINSPECTION:\n- get_object returns content, metadata, ACL and payload descriptors for one id.\n- list_payloads and get_object_acl return just those parts.\n- get_design_object and get_server_info describe the repository itself.\nNothing here modifies the repository.";

/// MCP handler exposing repository operations as tools and resources.
#[derive(Clone)]
pub struct CordraMcpCore {
    tool_router: ToolRouter<Self>,
    operations: Arc<RepositoryOperations>,
}

#[tool_router]
impl CordraMcpCore {
    /// Create a handler over shared repository operations.
    pub fn new(operations: Arc<RepositoryOperations>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            operations,
        }
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "Retrieve one digital object by id. Returns id, type, content, metadata, acl and payload descriptors (never payload bytes)."
    )]
    async fn get_object(&self, param: Parameters<ObjectIdParam>) -> Result<CallToolResult, ErrorData> {
        let outcome = self.operations.get_object(&param.0.id).await;
        respond("get_object", outcome, object_context(&param.0))
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "Search objects with a Lucene query and optional type filter. Input: query, type, pageNum (default 0), pageSize (default 25, capped), sortFields. Returns results, totalCount, pageNum, pageSize."
    )]
    async fn search_objects(&self, param: Parameters<SearchObjectsParam>) -> Result<CallToolResult, ErrorData> {
        let context = serde_json::to_value(&param.0).unwrap_or(Value::Null);
        let outcome = self.operations.search_objects(param.0.into()).await;
        respond("search_objects", outcome, context)
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "List the names of all object types that have a schema. Use these names with get_schema and as the search_objects type filter."
    )]
    async fn list_schemas(&self) -> Result<CallToolResult, ErrorData> {
        let outcome = self.operations.list_schemas().await.map(|schemas| serde_json::json!({ "schemas": schemas }));
        respond("list_schemas", outcome, Value::Null)
    }

    #[tool(annotations(read_only_hint = true), description = "Return the JSON Schema of one object type.")]
    async fn get_schema(&self, param: Parameters<SchemaParam>) -> Result<CallToolResult, ErrorData> {
        let outcome = self.operations.get_schema(&param.0.type_name).await;
        respond("get_schema", outcome, serde_json::json!({ "type": param.0.type_name }))
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "List payload descriptors (name, size, contentType) attached to an object. Payload bytes are never returned."
    )]
    async fn list_payloads(&self, param: Parameters<ObjectIdParam>) -> Result<CallToolResult, ErrorData> {
        let outcome = self
            .operations
            .list_payloads(&param.0.id)
            .await
            .map(|payloads| serde_json::json!({ "payloads": payloads }));
        respond("list_payloads", outcome, object_context(&param.0))
    }

    #[tool(annotations(read_only_hint = true), description = "Return the readers and writers of an object.")]
    async fn get_object_acl(&self, param: Parameters<ObjectIdParam>) -> Result<CallToolResult, ErrorData> {
        let outcome = self.operations.get_object_acl(&param.0.id).await;
        respond("get_object_acl", outcome, object_context(&param.0))
    }

    #[tool(annotations(read_only_hint = true), description = "Return version and capability metadata of the Cordra server.")]
    async fn get_server_info(&self) -> Result<CallToolResult, ErrorData> {
        let outcome = self.operations.get_server_info().await;
        respond("get_server_info", outcome, Value::Null)
    }

    #[tool(
        annotations(read_only_hint = true),
        description = "Return the repository design object: type registry, UI configuration and handle minting settings."
    )]
    async fn get_design_object(&self) -> Result<CallToolResult, ErrorData> {
        let outcome = self.operations.get_design_object().await;
        respond("get_design_object", outcome, Value::Null)
    }

    #[tool(annotations(read_only_hint = true), description = "Check that the MCP server is responding. Returns 'pong'.")]
    async fn ping(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("pong")]))
    }
}

#[tool_handler]
impl ServerHandler for CordraMcpCore {
    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move { Ok(list_resources(&self.operations).await) }
    }

    fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourceTemplatesResult, McpError>> + Send + '_ {
        std::future::ready(Ok(list_resource_templates()))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move { read_resource(&request.uri, &self.operations).await }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().enable_resources().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "cordra-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Cordra MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}

fn object_context(param: &ObjectIdParam) -> Value {
    serde_json::json!({ "id": param.id })
}

/// Turn an operation outcome into a structured tool result or a structured error.
fn respond<T: Serialize>(tool_name: &str, outcome: Result<T, AdapterError>, context: Value) -> Result<CallToolResult, ErrorData> {
    let entity = outcome.map_err(|error| {
        warn!(tool = tool_name, code = error.error_code(), error = %error, "tool call failed");
        adapter_error(&error, context.clone())
    })?;
    let structured = serde_json::to_value(&entity).map_err(|error| {
        adapter_error(
            &AdapterError::malformed_response(format!("failed to serialize {tool_name} result: {error}")),
            context,
        )
    })?;
    debug!(tool = tool_name, "tool call succeeded");
    Ok(CallToolResult::structured(structured))
}
