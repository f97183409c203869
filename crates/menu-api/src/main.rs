//! Menu prefetch API server.

use menu_api::server::{self, AppState};
use menu_prefetch::{PrefetchConfig, PrefetchCoordinator};
use menu_transport::HttpJobTransport;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PrefetchConfig::from_env()?;
    let transport = HttpJobTransport::from_env();
    tracing::info!(
        transport = ?transport,
        poll_interval = ?config.poll_interval,
        timeout = ?config.timeout,
        "menu prefetch configured"
    );
    let coordinator = Arc::new(PrefetchCoordinator::new(Arc::new(transport), config));

    let app = server::router(Arc::new(AppState {
        coordinator: Arc::clone(&coordinator),
    }));
    let addr: SocketAddr = std::env::var("MENU_API_LISTEN")
        .unwrap_or_else(|_| "0.0.0.0:8002".to_string())
        .parse()?;
    tracing::info!("menu prefetch API listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    coordinator.cancel_all();
    tracing::info!("poll workers disowned; shutting down");
    Ok(())
}
