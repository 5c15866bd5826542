//! Join inventory with usage into flat metric records.
//!
//! Node records are driven by usage samples: every sample yields one
//! [`Metric`], and capacity fields stay empty when the node is missing from
//! inventory. Pod records are driven by inventory and carry only the
//! declared limits of the primary container.

use std::collections::HashMap;

use k8s_openapi::api::core::v1::{Container, Node, Pod, PodSpec, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::k8s::NodeMetrics;
use crate::quantity::{cpu_millis, memory_bytes};

/// Flat usage/capacity record. CPU fields are milli-units, memory fields
/// are bytes, and `""` means no data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Metric {
    pub name: String,
    pub cpu: String,
    pub cpu_total: String,
    pub memory: String,
    pub memory_total: String,
}

/// A pod as listed by the API server, plus its limit-derived [`Metric`].
#[derive(Clone, Debug, Serialize)]
pub struct PodMetric {
    pub spec: PodSpec,
    pub metadata: ObjectMeta,
    pub status: PodStatus,
    pub metrics: Metric,
}

/// `{"items": [...]}` envelope used by the correlated endpoints.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// Build one [`Metric`] per usage sample, in sample order.
pub fn correlate_nodes(
    usage: &[NodeMetrics],
    inventory: &[Node],
) -> Result<Vec<Metric>, AppError> {
    let by_name: HashMap<&str, &Node> = inventory
        .iter()
        .filter_map(|node| node.metadata.name.as_deref().map(|name| (name, node)))
        .collect();

    usage
        .iter()
        .map(|sample| -> Result<Metric, AppError> {
            let name = sample.metadata.name.clone().unwrap_or_default();
            let allocatable = by_name
                .get(name.as_str())
                .and_then(|node| node.status.as_ref())
                .and_then(|status| status.allocatable.as_ref());

            if allocatable.is_none() {
                debug!(node = %name, "No allocatable capacity for usage sample");
            }

            Ok(Metric {
                cpu: cpu_millis(sample.cpu())?,
                cpu_total: cpu_millis(allocatable.and_then(|a| a.get("cpu")))?,
                memory: memory_bytes(sample.memory())?,
                memory_total: memory_bytes(allocatable.and_then(|a| a.get("memory")))?,
                name,
            })
        })
        .collect()
}

/// The container whose limits represent the whole pod.
///
/// Only the first declared container is considered; sidecars are ignored.
pub fn primary_container(pod: &Pod) -> Result<&Container, AppError> {
    pod.spec
        .as_ref()
        .and_then(|spec| spec.containers.first())
        .ok_or_else(|| AppError::NoContainers {
            namespace: pod.metadata.namespace.clone().unwrap_or_default(),
            name: pod.metadata.name.clone().unwrap_or_default(),
        })
}

/// Limit-derived metric for a single pod.
///
/// Totals are filled only when the primary container declares requests;
/// live usage is not joined here, so `cpu` and `memory` stay empty.
fn pod_limits_metric(pod: &Pod) -> Result<Metric, AppError> {
    let mut metric = Metric {
        name: pod.metadata.name.clone().unwrap_or_default(),
        ..Metric::default()
    };

    let Some(resources) = primary_container(pod)?.resources.as_ref() else {
        return Ok(metric);
    };
    if resources.requests.is_none() {
        return Ok(metric);
    }

    let limits = resources.limits.as_ref();
    metric.cpu_total = cpu_millis(limits.and_then(|l| l.get("cpu")))?;
    metric.memory_total = memory_bytes(limits.and_then(|l| l.get("memory")))?;
    Ok(metric)
}

/// Build one [`PodMetric`] per inventory pod, in inventory order.
pub fn correlate_pods(pods: Vec<Pod>) -> Result<Vec<PodMetric>, AppError> {
    pods.into_iter()
        .map(|pod| -> Result<PodMetric, AppError> {
            let metrics = pod_limits_metric(&pod)?;
            Ok(PodMetric {
                spec: pod.spec.unwrap_or_default(),
                metadata: pod.metadata,
                status: pod.status.unwrap_or_default(),
                metrics,
            })
        })
        .collect()
}
