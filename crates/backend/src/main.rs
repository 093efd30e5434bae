pub mod api;
pub mod dashboards;
pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod state;
pub mod system;

use anyhow::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use shared::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load_config()?;

    let log_dir = config::get_log_dir(&config)?;
    system::tracing::initialize(&log_dir)?;

    tracing::info!(
        "Starting {} v{} with '{}' storage",
        handlers::health::SERVICE_NAME,
        env!("CARGO_PKG_VERSION"),
        config.storage.backend.as_str()
    );

    let repositories = shared::data::build_repositories(&config)
        .await
        .context("storage init failed")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let state = state::AppState::new(config, repositories)?;
    let app = routes::configure_routes(state);

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
