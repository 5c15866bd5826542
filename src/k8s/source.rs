//! Inventory and usage queries.
//!
//! Both sources are thin: one list call per resource, errors attributed to
//! the call and otherwise passed through unchanged.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::Client;
use kube::api::{Api, ListParams, ObjectList};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::metrics::{NodeMetrics, PodMetrics};
use crate::error::AppError;

/// A list response in the API server's own shape.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemList<T> {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ListMeta,
    pub items: Vec<T>,
}

impl<T> ItemList<T> {
    pub fn new(api_version: &str, kind: &str, items: Vec<T>) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            metadata: ListMeta::default(),
            items,
        }
    }

    fn from_object_list(api_version: &str, kind: &str, list: ObjectList<T>) -> Self
    where
        T: Clone,
    {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            metadata: list.metadata,
            items: list.items,
        }
    }
}

/// Declared cluster objects from the control plane.
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list_nodes(&self) -> Result<ItemList<Node>, AppError>;

    /// Pods across all namespaces.
    async fn list_pods(&self) -> Result<ItemList<Pod>, AppError>;

    /// Services across all namespaces.
    async fn list_services(&self) -> Result<ItemList<Service>, AppError>;

    /// API server build version, used as a connectivity probe.
    async fn server_version(&self) -> Result<String, AppError>;
}

/// Live usage samples from metrics-server.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn list_node_metrics(&self) -> Result<ItemList<NodeMetrics>, AppError>;

    /// Pod samples across all namespaces.
    async fn list_pod_metrics(&self) -> Result<ItemList<PodMetrics>, AppError>;
}

/// Both sources backed by a single kube client.
#[derive(Clone)]
pub struct KubeSource {
    client: Client,
}

impl KubeSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InventorySource for KubeSource {
    async fn list_nodes(&self) -> Result<ItemList<Node>, AppError> {
        let api: Api<Node> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| AppError::kubernetes("list nodes", e))?;
        debug!(count = list.items.len(), "Listed nodes");
        Ok(ItemList::from_object_list("v1", "NodeList", list))
    }

    async fn list_pods(&self) -> Result<ItemList<Pod>, AppError> {
        let api: Api<Pod> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| AppError::kubernetes("list pods", e))?;
        debug!(count = list.items.len(), "Listed pods");
        Ok(ItemList::from_object_list("v1", "PodList", list))
    }

    async fn list_services(&self) -> Result<ItemList<Service>, AppError> {
        let api: Api<Service> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| AppError::kubernetes("list services", e))?;
        debug!(count = list.items.len(), "Listed services");
        Ok(ItemList::from_object_list("v1", "ServiceList", list))
    }

    async fn server_version(&self) -> Result<String, AppError> {
        let info = self
            .client
            .apiserver_version()
            .await
            .map_err(|e| AppError::kubernetes("get server version", e))?;
        Ok(info.git_version)
    }
}

#[async_trait]
impl UsageSource for KubeSource {
    async fn list_node_metrics(&self) -> Result<ItemList<NodeMetrics>, AppError> {
        let api: Api<NodeMetrics> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| AppError::kubernetes("list node metrics", e))?;
        debug!(count = list.items.len(), "Listed node metrics");
        Ok(ItemList::from_object_list(
            "metrics.k8s.io/v1beta1",
            "NodeMetricsList",
            list,
        ))
    }

    async fn list_pod_metrics(&self) -> Result<ItemList<PodMetrics>, AppError> {
        let api: Api<PodMetrics> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| AppError::kubernetes("list pod metrics", e))?;
        debug!(count = list.items.len(), "Listed pod metrics");
        Ok(ItemList::from_object_list(
            "metrics.k8s.io/v1beta1",
            "PodMetricsList",
            list,
        ))
    }
}
