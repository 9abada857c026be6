use std::net::SocketAddr;
use std::sync::Arc;

use autoupload_core::config::Settings;
use autoupload_upload::{HttpUploader, UploadExecutor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autoupload_api::config::{self, ServerConfig};
use autoupload_api::router::build_app_router;
use autoupload_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config_path = config::config_path_from_env();
    let settings = match Settings::load(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing("info");
            tracing::error!(path = %config_path.display(), error = %e, "Failed to load config");
            std::process::exit(1);
        }
    };

    // --- Tracing ---
    init_tracing(settings.app.filter_level());

    let server_config = ServerConfig::from_env(&settings.app);
    tracing::info!(
        path = %config_path.display(),
        rooms = ?settings.rooms.room_ids(),
        host = %server_config.host,
        port = server_config.port,
        "Loaded configuration",
    );
    if settings.rooms.is_empty() {
        tracing::warn!("No [room_<id>] tables configured; every event will be rejected");
    }

    // --- Uploader ---
    let uploader = HttpUploader::new(settings.app.accept_invalid_certs)
        .expect("Failed to build HTTP client");
    if settings.app.accept_invalid_certs {
        tracing::warn!("TLS certificate verification is disabled for uploads");
    }

    // --- App state ---
    let executor = UploadExecutor::new(Arc::new(uploader));
    let state = AppState {
        rooms: Arc::new(settings.rooms),
        executor: executor.clone(),
    };

    let app = build_app_router(state, &server_config);

    // --- Start server ---
    let addr = SocketAddr::new(
        server_config.host.parse().expect("Invalid HOST address"),
        server_config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Let detached uploads finish before the runtime goes away.
    tracing::info!(running = executor.in_flight(), "Server stopped accepting events");
    executor.shutdown().await;
    tracing::info!("Server stopped");
}

/// Install the global subscriber. `RUST_LOG` wins over the config level.
fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "autoupload_api={level},autoupload_upload={level},\
                     autoupload_core={level},tower_http={level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
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
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
