//! Domainforge API server binary.

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use domainforge_rate_limit::DomainforgeConfig;
use domainforge_server::{
    AppState, ObservabilityConfig, USER_EMAIL_HEADER, create_router, init_observability,
    services_from_env,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Domainforge domain suggestion API server", long_about = None)]
struct Args {
    /// Extra configuration file layered over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides configuration)
    #[arg(long)]
    host: Option<String>,

    /// Emit JSON-formatted logs
    #[arg(long)]
    json_logs: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid CORS origin: {}", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(USER_EMAIL_HEADER),
        ]))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    init_observability(
        &ObservabilityConfig::default()
            .with_log_level(level)
            .with_json_logs(args.json_logs),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let mut config =
        DomainforgeConfig::load_with(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;
    let cors = cors_layer(&config.server.cors_origin)?;

    let services = services_from_env(&config)
        .await
        .context("Failed to initialize services")?;
    info!(?services, "Services initialized");

    let app = create_router(AppState::new(config, services))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Domainforge server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}
