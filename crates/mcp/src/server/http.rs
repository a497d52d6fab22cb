//! Streamable HTTP hosting at `/mcp`, restricted to loopback addresses.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use axum::Router;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::operations::RepositoryOperations;
use crate::server::core::CordraMcpCore;

/// Default bind address: loopback with an OS-assigned port.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:0";

const MCP_PATH: &str = "/mcp";

/// An HTTP host for MCP sessions over one shared set of repository operations.
#[derive(Debug, Clone)]
pub struct McpHttpServer {
    bind_address: SocketAddr,
    operations: Arc<RepositoryOperations>,
}

impl McpHttpServer {
    pub fn new(bind_address: SocketAddr, operations: Arc<RepositoryOperations>) -> Self {
        Self { bind_address, operations }
    }

    /// Bind the listener and serve in a background task.
    ///
    /// Each MCP session gets its own [`CordraMcpCore`]; all of them share the
    /// same operations and HTTP connection pool.
    pub async fn start(self) -> Result<RunningMcpHttpServer> {
        let listener = TcpListener::bind(self.bind_address)
            .await
            .with_context(|| format!("failed to bind MCP HTTP server to {}", self.bind_address))?;
        let bound_address = listener.local_addr()?;

        let shutdown = CancellationToken::new();
        let operations = self.operations;
        let service: StreamableHttpService<CordraMcpCore, LocalSessionManager> = StreamableHttpService::new(
            move || Ok(CordraMcpCore::new(Arc::clone(&operations))),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                stateful_mode: true,
                sse_keep_alive: None,
                cancellation_token: shutdown.child_token(),
                ..Default::default()
            },
        );
        let router = Router::new().nest_service(MCP_PATH, service);

        let server_task = tokio::spawn({
            let shutdown = shutdown.child_token();
            async move {
                let served = axum::serve(listener, router)
                    .with_graceful_shutdown(async move { shutdown.cancelled().await })
                    .await;
                if let Err(error) = served {
                    warn!(error = %error, "MCP HTTP server stopped with an error");
                }
            }
        });
        info!(address = %bound_address, path = MCP_PATH, "MCP HTTP server listening");

        Ok(RunningMcpHttpServer {
            bound_address,
            shutdown,
            server_task,
        })
    }
}

/// Handle to a started server; dropping it leaves the server running.
#[derive(Debug)]
pub struct RunningMcpHttpServer {
    bound_address: SocketAddr,
    shutdown: CancellationToken,
    server_task: JoinHandle<()>,
}

impl RunningMcpHttpServer {
    /// Address actually bound, with the OS-assigned port filled in.
    pub fn bound_address(&self) -> SocketAddr {
        self.bound_address
    }

    /// URL clients should connect to.
    pub fn endpoint(&self) -> String {
        format!("http://{}{MCP_PATH}", self.bound_address)
    }

    /// Cancel open sessions, stop accepting connections and wait for the server task.
    pub async fn stop(self) -> Result<()> {
        self.shutdown.cancel();
        self.server_task
            .await
            .map_err(|error| anyhow!("MCP HTTP server task failed: {error}"))?;
        info!(address = %self.bound_address, "MCP HTTP server stopped");
        Ok(())
    }
}

/// Parse a bind address and refuse anything but loopback.
pub fn resolve_bind_address(bind_address: Option<&str>) -> Result<SocketAddr> {
    let address = bind_address.unwrap_or(DEFAULT_BIND_ADDRESS);
    let parsed: SocketAddr = address
        .parse()
        .map_err(|error| anyhow!("invalid MCP HTTP bind address '{address}': {error}"))?;
    if !parsed.ip().is_loopback() {
        bail!("MCP HTTP server must bind to a loopback address, got {}", parsed.ip());
    }
    Ok(parsed)
}
