//! Application state shared across handlers

use std::sync::Arc;

use crate::k8s::{InventorySource, KubeSource, UsageSource};

/// Handles to the external sources. Nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<dyn InventorySource>,
    pub usage: Arc<dyn UsageSource>,
}

impl AppState {
    pub fn new(inventory: Arc<dyn InventorySource>, usage: Arc<dyn UsageSource>) -> Self {
        Self { inventory, usage }
    }

    /// Serve both inventory and usage from one kube client.
    pub fn from_kube(source: KubeSource) -> Self {
        let source = Arc::new(source);
        Self {
            inventory: source.clone(),
            usage: source,
        }
    }
}
