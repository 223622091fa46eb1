//! HTTP server command handler.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{routing::get, Router};
use color_eyre::Result;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use tower::ServiceBuilder;

use crate::config::Config;
use crate::context::Context;
use crate::mcp::{health, McpServer};

use super::App;

impl App {
    /// Run the MCP server with HTTP transport.
    pub async fn run_serve(&self, host: &str, port: u16) -> Result<()> {
        tracing::info!("Starting MAGMA HTTP server");

        let config = Config::load()?;
        let ctx = Arc::new(Context::from(config).await?);
        let started_at = Instant::now();

        let inner_ctx = ctx.clone();
        let service = StreamableHttpService::new(
            move || Ok(McpServer::new((*inner_ctx).clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig::default(),
        );

        let health_ctx = ctx.clone();
        let app = Router::new()
            .route(
                "/health",
                get(move || health::health(health_ctx.clone(), started_at)),
            )
            .fallback_service(ServiceBuilder::new().service(service));

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid address {}:{}: {}", host, port, e))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to bind to {}: {}", addr, e))?;

        tracing::info!("MAGMA HTTP server listening on http://{}", addr);

        axum::serve(listener, app).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            color_eyre::eyre::eyre!("HTTP server error: {}", e)
        })?;

        tracing::info!("HTTP server shutting down");
        Ok(())
    }
}
