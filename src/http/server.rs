//! HTTP server setup.
//!
//! # Responsibilities
//! - Bind a route table onto an axum router
//! - Expose the registered table at `GET /_routes`
//! - Wire up tower-http layers (tracing, timeout, body limit)
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::binder::AxumHost;
use crate::config::AppConfig;
use crate::error::{BindError, ErrorPipeline};
use crate::routing::{RouteBuilder, RouteSummary};

/// Path of the route listing endpoint.
pub const ROUTES_PATH: &str = "/_routes";

/// HTTP server serving one bound route table.
pub struct AppServer {
    router: Router,
    config: AppConfig,
}

impl AppServer {
    /// Bind `routes` with the default error pipeline.
    pub fn new(config: AppConfig, routes: &RouteBuilder) -> Result<Self, BindError> {
        Self::with_error_pipeline(config, routes, ErrorPipeline::default())
    }

    pub fn with_error_pipeline(
        config: AppConfig,
        routes: &RouteBuilder,
        pipeline: ErrorPipeline,
    ) -> Result<Self, BindError> {
        let mut host = AxumHost::new()
            .with_error_handler(pipeline)
            .with_body_limit(config.limits.body_limit_bytes);
        routes.apply(&mut host)?;

        let summaries: Arc<Vec<RouteSummary>> = Arc::new(routes.routes().collect());
        let mut router = host.into_router();
        if routes.entries().iter().any(|e| e.path == ROUTES_PATH) {
            tracing::warn!(path = ROUTES_PATH, "Route listing shadowed by a registered route");
        } else {
            router = router.route(
                ROUTES_PATH,
                get(move || {
                    let summaries = summaries.clone();
                    async move { Json(summaries.as_ref().clone()) }
                }),
            );
        }

        let router = Self::layer(router, &config);
        Ok(Self { router, config })
    }

    #[allow(deprecated)]
    fn layer(router: Router, config: &AppConfig) -> Router {
        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.limits.body_limit_bytes))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
