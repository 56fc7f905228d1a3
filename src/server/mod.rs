pub mod error;
pub mod handlers;
pub mod logs;
pub mod state;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;

pub use self::{
    error::AppError,
    state::{AppState, LogState},
};

/// Build the HTTP router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::serve_form))
        .route("/health", get(handlers::health_check))
        .route("/api/providers", get(handlers::get_providers))
        .route("/api/form", get(handlers::get_form).post(handlers::update_form))
        .route("/api/form/submit", post(handlers::submit_form))
        .route("/api/merge", post(handlers::merge_config))
        .route("/api/logs", post(logs::query_logs))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn start_server(config: AppConfig, log_state: LogState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(&config, log_state);
    info!(
        "Loaded {} provider preset(s), {} API mode(s)",
        state.registry.presets().len(),
        state.registry.api_modes().len()
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("signal received, starting graceful shutdown");
}
