//! Read-only Model Context Protocol (MCP) adapter for a Cordra repository.
//!
//! This crate loads adapter configuration, maps MCP tool and resource calls
//! onto Cordra's REST API, and reshapes the answers into stable entities.

pub mod config;
pub mod normalize;
pub mod operations;
pub mod server;
pub mod types;

pub use config::{ConfigError, CordraConfig, LogLevel, load_config};
pub use operations::{RepositoryOperations, SearchRequest};
pub use server::{CordraMcpCore, McpHttpServer, RunningMcpHttpServer, serve_stdio};
pub use types::{AdapterError, ErrorKind};
