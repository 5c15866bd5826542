//! HTTP layer
//!
//! # Module Structure
//! - `handlers`: HTTP request handlers
//! - `state`: application state

mod handlers;
mod state;

pub use handlers::{
    PrettyJson, healthz, list_nodes, list_pods, list_services, node_metrics, pod_metrics, readyz,
    to_pretty_json,
};
pub use state::AppState;

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Result;
use axum::{Router, http::Method, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::Config;

/// Build the router. Unmatched paths are served from `static_dir`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/nodes", get(list_nodes))
        .route("/pods", get(list_pods))
        .route("/services", get(list_services))
        .route("/metrics/nodes", get(node_metrics))
        .route("/metrics/pods", get(pod_metrics))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .with_state(state)
}

pub async fn run(
    config: &Config,
    state: AppState,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> Result<()> {
    let app = router(state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        addr = %addr,
        static_dir = %config.static_dir.display(),
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
            info!("Server shutting down");
        })
        .await?;

    Ok(())
}
