//! DeepTrace Server - REST API for deepfake analysis
//!
//! Exposes deeptrace-core over HTTP:
//! - POST /api/analyze - Score an uploaded MP4/AVI
//! - POST /api/verify - Look up a file digest on the ledger
//! - GET /api/stats - Recent analyses

use std::net::SocketAddr;

use deeptrace_server::{create_router_with_config, store, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deeptrace_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        frame_count = config.frame_count,
        max_file_size_mb = config.max_file_size_mb,
        "Starting DeepTrace server"
    );

    let store = store::connect(&config).await;
    let app = create_router_with_config(&config, store);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("API docs at http://{}/swagger-ui", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
