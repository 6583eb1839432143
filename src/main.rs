//! route-facade demo server
//!
//! Registers the sample route table, binds it onto axum and serves it.
//!
//! ```text
//!   RouteBuilder ──▶ binder::apply ──▶ AxumHost ──▶ AppServer ──▶ axum::serve
//!   (web::register)   (resolve,         (axum::Router   (/_routes,
//!                      validate)         per method)     tower-http layers)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use route_facade::config::{load_config, AppConfig};
use route_facade::http::AppServer;
use route_facade::observability::logging;
use route_facade::routing::RouteBuilder;
use route_facade::web;

#[derive(Parser)]
#[command(name = "route-facade")]
#[command(about = "Serve the sample route table on axum", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the registered routes and exit.
    #[arg(long)]
    list_routes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability.log_filter);
    tracing::info!("route-facade v{} starting", env!("CARGO_PKG_VERSION"));

    let mut routes = RouteBuilder::new();
    web::register(&mut routes);

    if cli.list_routes {
        for summary in routes.routes() {
            println!("{}", summary);
        }
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        body_limit_bytes = config.limits.body_limit_bytes,
        routes = routes.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = AppServer::new(config, &routes)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
