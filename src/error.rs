//! Custom error types for kube-dashboard-api.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::quantity::QuantityError;

/// Errors that can occur while serving cluster data.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Kubernetes API error: {0}")]
    KubernetesApi(String),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    #[error("Invalid resource quantity: {0}")]
    Quantity(#[from] QuantityError),

    #[error("Pod {namespace}/{name} has no containers")]
    NoContainers { namespace: String, name: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Attribute a kube client failure to the call that produced it.
    pub fn kubernetes<E: std::fmt::Display>(operation: &str, err: E) -> Self {
        Self::KubernetesApi(format!("{operation}: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        error!(error = %message, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}
