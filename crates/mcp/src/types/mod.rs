//! Shared types for the Cordra MCP adapter.

pub mod errors;

pub use errors::{AdapterError, ErrorKind};
