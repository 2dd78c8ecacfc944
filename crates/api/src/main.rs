use std::net::SocketAddr;
use std::sync::Arc;

use hippolens_core::dataset::Dataset;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hippolens_api::config::ServerConfig;
use hippolens_api::router::build_app_router;
use hippolens_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hippolens_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        dataset_dir = %config.dataset_dir.display(),
        client_dir = %config.client_dir.display(),
        "Loaded server configuration"
    );

    // --- Dataset ---
    let dataset = Dataset::load(&config.dataset_dir).expect("Failed to load annotation dataset");
    for path in dataset.missing_tables() {
        tracing::warn!(path = %path.display(), "Annotation table not found, treating as empty");
    }
    if dataset.skipped_entries() > 0 {
        tracing::warn!(
            skipped = dataset.skipped_entries(),
            "Skipped table entries that are not annotation records"
        );
    }
    tracing::info!(
        images = dataset.len(),
        records = dataset.record_count(),
        "Dataset loaded"
    );

    // --- App state ---
    let state = AppState {
        dataset: Arc::new(dataset),
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
