//! HTTP API serving dashboard queries.
//!
//! Each request runs against a session: the query takes a ticket, runs the
//! pipeline, and publishes its snapshot only if no newer query was started in
//! the meantime. Stale sessions are cleaned up in the background.

pub mod routes;

use std::net::SocketAddr;

use crate::pipeline::{self, Dashboard, PipelineContext};

/// HTTP server for the dashboards.
pub struct DashboardServer {
    ctx: PipelineContext,
    dashboards: Vec<Box<dyn Dashboard>>,
}

impl DashboardServer {
    /// Create a server with every dashboard registered.
    #[must_use]
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx, dashboards: pipeline::register_all_dashboards() }
    }

    /// Run the server until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        tracing::info!("Starting dashboard server on port {}", port);
        tracing::info!("Registered {} dashboards", self.dashboards.len());

        let router = routes::create_router(self.dashboards, self.ctx);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for DashboardServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardServer").field("dashboards", &self.dashboards.len()).finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
