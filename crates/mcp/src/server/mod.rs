mod core;
mod errors;
mod http;
mod resources;
mod schemas;
mod stdio;

pub use core::CordraMcpCore;
pub use errors::adapter_error;
pub use http::{DEFAULT_BIND_ADDRESS, McpHttpServer, RunningMcpHttpServer, resolve_bind_address};
pub use resources::{DESIGN_OBJECT_URI, OBJECTS_URI, ResourceTarget, SCHEMAS_URI, list_resource_templates, list_resources, parse_resource_uri, read_resource, schema_resource_uri};
pub use schemas::{ObjectIdParam, SchemaParam, SearchObjectsParam};
pub use stdio::serve_stdio;
