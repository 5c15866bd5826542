//! Kubernetes access layer
//!
//! # Module Structure
//! - `client`: credential resolution and client construction
//! - `metrics`: `metrics.k8s.io/v1beta1` resource types
//! - `source`: inventory and usage query traits with the kube-backed implementation

pub mod client;
pub mod metrics;
pub mod source;

pub use client::build_client;
pub use metrics::{ContainerMetrics, NodeMetrics, PodMetrics};
pub use source::{InventorySource, ItemList, KubeSource, UsageSource};
