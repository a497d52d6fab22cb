//! MCP over stdin/stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use tracing::info;

use crate::operations::RepositoryOperations;
use crate::server::core::CordraMcpCore;

/// Serve a single MCP session over stdio until the client disconnects.
///
/// Stdout carries protocol frames only; logging must go to stderr.
pub async fn serve_stdio(operations: Arc<RepositoryOperations>) -> Result<()> {
    info!("starting MCP server on stdio");
    let service = CordraMcpCore::new(operations)
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP stdio session")?;
    service.waiting().await.context("MCP stdio session failed")?;
    info!("MCP stdio session ended");
    Ok(())
}
