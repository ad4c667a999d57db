use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

use storefront_api::{
    config::Config,
    db::{Backend, MemoryBackend, RestBackend},
    routes::{create_router, AppState},
    services::ActivityRecorder,
};

const DEFAULT_LOG_FILTER: &str = "storefront_api=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;

    let backend: Arc<dyn Backend> = match &config.backend_url {
        Some(url) => Arc::new(RestBackend::new(url.as_str(), config.backend_api_key.as_str())),
        None => {
            tracing::warn!("BACKEND_URL not set, serving from an empty in-memory backend");
            Arc::new(MemoryBackend::new())
        }
    };
    tracing::info!(backend = backend.name(), "Backend selected");

    let (activity, activity_writer) =
        ActivityRecorder::spawn(backend.clone(), config.activity_queue_capacity);

    let state = Arc::new(AppState::new(backend, activity, &config));
    let app = create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    tracing::info!("Server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Router (and every recorder clone it held) is gone; flush pending events.
    activity_writer.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
