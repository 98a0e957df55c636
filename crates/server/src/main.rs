//! curio-mcp server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use curio_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod handler;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        db_path = %config.db_path.display(),
        movements = config.movements.len(),
        "Starting curio MCP server on stdio transport"
    );

    let shutdown = CancellationToken::new();
    let state = state::AppState::open(config, shutdown.clone()).await?;

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        }
    });

    let handler = handler::CurioServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    tokio::select! {
        quit = server.waiting() => {
            quit?;
        }
        _ = shutdown.cancelled() => {
            tracing::info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
