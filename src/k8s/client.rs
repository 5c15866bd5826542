//! Kubernetes client builder for in-cluster and kubeconfig credentials.

use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::debug;

use crate::config::ClusterAuth;
use crate::error::AppError;

/// Build a Kubernetes client for the resolved credential source.
pub async fn build_client(auth: &ClusterAuth) -> Result<kube::Client, AppError> {
    let config = match auth {
        ClusterAuth::InCluster => {
            debug!("Using in-cluster service account");
            kube::Config::incluster().map_err(|e| AppError::Kubeconfig(e.to_string()))?
        }
        ClusterAuth::Kubeconfig(path) => {
            debug!(path = %path.display(), "Using kubeconfig file");
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| AppError::Kubeconfig(format!("{}: {}", path.display(), e)))?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| AppError::Kubeconfig(format!("{}: {}", path.display(), e)))?
        }
    };

    kube::Client::try_from(config).map_err(|e| AppError::Kubeconfig(e.to_string()))
}
