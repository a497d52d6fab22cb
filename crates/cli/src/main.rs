//! cordra-mcp-server - read-only MCP access to a Cordra repository
//!
//! Subcommands:
//! - `cordra-mcp-server stdio` - serve one MCP session over stdin/stdout (default)
//! - `cordra-mcp-server http --bind 127.0.0.1:8765` - serve MCP over streamable HTTP at `/mcp`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cordra_mcp::config::CordraConfig;
use cordra_mcp::server::{McpHttpServer, resolve_bind_address, serve_stdio};
use cordra_mcp::{RepositoryOperations, load_config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cordra-mcp-server")]
#[command(about = "Read-only MCP server for Cordra digital object repositories")]
#[command(version)]
struct Cli {
    /// JSON config file; defaults to CORDRA_CONFIG_PATH or the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout
    Stdio,

    /// Serve MCP over streamable HTTP on a loopback address
    Http {
        /// Socket address to bind (loopback only)
        #[arg(long, default_value = "127.0.0.1:8765")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("failed to load Cordra MCP configuration")?;
    init_tracing(&config);
    info!(base_url = %config.base_url, authenticated = config.is_authenticated(), "configuration loaded");

    let operations = Arc::new(RepositoryOperations::from_config(&config).context("failed to build Cordra client")?);

    match cli.command.unwrap_or(Commands::Stdio) {
        Commands::Stdio => serve_stdio(operations).await,
        Commands::Http { bind } => run_http(&bind, operations).await,
    }
}

async fn run_http(bind: &str, operations: Arc<RepositoryOperations>) -> Result<()> {
    let address = resolve_bind_address(Some(bind))?;
    let server = McpHttpServer::new(address, operations).start().await?;
    eprintln!("Cordra MCP server listening on {}", server.endpoint());

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("shutting down");
    server.stop().await
}

/// Log to stderr so stdout stays reserved for protocol frames.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(config: &CordraConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},rmcp=warn", config.log_level.as_filter_directive())));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
