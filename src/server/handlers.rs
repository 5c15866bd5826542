//! HTTP request handlers for API endpoints

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use k8s_openapi::api::core::v1::{Node, Service};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, warn};

use crate::correlate::{Items, Metric, PodMetric, correlate_nodes, correlate_pods};
use crate::error::AppError;
use crate::k8s::{ItemList, PodMetrics};

use super::state::AppState;

/// JSON body indented with four spaces.
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match to_pretty_json(&self.0) {
            Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => AppError::from(e).into_response(),
        }
    }
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut body = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut body, formatter);
    value.serialize(&mut serializer)?;
    Ok(body)
}

/// Liveness probe
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe: succeeds while the API server answers.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.inventory.server_version().await {
        Ok(version) => {
            debug!(version = %version, "Readiness check passed");
            (StatusCode::OK, "ok".to_string())
        }
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

/// Raw node inventory
pub async fn list_nodes(
    State(state): State<AppState>,
) -> Result<PrettyJson<ItemList<Node>>, AppError> {
    Ok(PrettyJson(state.inventory.list_nodes().await?))
}

/// Pods with limit-derived metrics
pub async fn list_pods(
    State(state): State<AppState>,
) -> Result<PrettyJson<Items<PodMetric>>, AppError> {
    let pods = state.inventory.list_pods().await?;
    let records = correlate_pods(pods.items)?;
    debug!(count = records.len(), "Correlated pods");
    Ok(PrettyJson(records.into()))
}

/// Raw service inventory
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<PrettyJson<ItemList<Service>>, AppError> {
    Ok(PrettyJson(state.inventory.list_services().await?))
}

/// Node usage joined with allocatable capacity
pub async fn node_metrics(
    State(state): State<AppState>,
) -> Result<PrettyJson<Items<Metric>>, AppError> {
    let (usage, inventory) = futures::try_join!(
        state.usage.list_node_metrics(),
        state.inventory.list_nodes()
    )?;
    let metrics = correlate_nodes(&usage.items, &inventory.items)?;
    debug!(count = metrics.len(), "Correlated node metrics");
    Ok(PrettyJson(metrics.into()))
}

/// Raw pod usage samples
pub async fn pod_metrics(
    State(state): State<AppState>,
) -> Result<PrettyJson<ItemList<PodMetrics>>, AppError> {
    Ok(PrettyJson(state.usage.list_pod_metrics().await?))
}
