//! Integration tests for the HTTP endpoints against in-memory sources

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::{Node, Pod, Service};
use kube_dashboard_api::error::AppError;
use kube_dashboard_api::k8s::{InventorySource, ItemList, NodeMetrics, PodMetrics, UsageSource};
use kube_dashboard_api::server::{AppState, router};
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Default)]
struct FakeInventory {
    nodes: Vec<Node>,
    pods: Vec<Pod>,
    services: Vec<Service>,
    unreachable: bool,
}

impl FakeInventory {
    fn check(&self, operation: &str) -> Result<(), AppError> {
        if self.unreachable {
            return Err(AppError::kubernetes(operation, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl InventorySource for FakeInventory {
    async fn list_nodes(&self) -> Result<ItemList<Node>, AppError> {
        self.check("list nodes")?;
        Ok(ItemList::new("v1", "NodeList", self.nodes.clone()))
    }

    async fn list_pods(&self) -> Result<ItemList<Pod>, AppError> {
        self.check("list pods")?;
        Ok(ItemList::new("v1", "PodList", self.pods.clone()))
    }

    async fn list_services(&self) -> Result<ItemList<Service>, AppError> {
        self.check("list services")?;
        Ok(ItemList::new("v1", "ServiceList", self.services.clone()))
    }

    async fn server_version(&self) -> Result<String, AppError> {
        self.check("get server version")?;
        Ok("v1.31.0".to_string())
    }
}

#[derive(Default)]
struct FakeUsage {
    nodes: Vec<NodeMetrics>,
    pods: Vec<PodMetrics>,
    unreachable: bool,
}

#[async_trait]
impl UsageSource for FakeUsage {
    async fn list_node_metrics(&self) -> Result<ItemList<NodeMetrics>, AppError> {
        if self.unreachable {
            return Err(AppError::kubernetes(
                "list node metrics",
                "the server could not find the requested resource",
            ));
        }
        Ok(ItemList::new(
            "metrics.k8s.io/v1beta1",
            "NodeMetricsList",
            self.nodes.clone(),
        ))
    }

    async fn list_pod_metrics(&self) -> Result<ItemList<PodMetrics>, AppError> {
        Ok(ItemList::new(
            "metrics.k8s.io/v1beta1",
            "PodMetricsList",
            self.pods.clone(),
        ))
    }
}

fn node(name: &str, cpu: &str, memory: &str) -> Node {
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Node",
        "metadata": { "name": name },
        "status": { "allocatable": { "cpu": cpu, "memory": memory } }
    }))
    .unwrap()
}

fn node_usage(name: &str, cpu: &str, memory: &str) -> NodeMetrics {
    serde_json::from_value(json!({
        "kind": "NodeMetrics",
        "apiVersion": "metrics.k8s.io/v1beta1",
        "metadata": { "name": name },
        "timestamp": "2024-05-01T10:00:00Z",
        "window": "20s",
        "usage": { "cpu": cpu, "memory": memory }
    }))
    .unwrap()
}

fn pod(name: &str, containers: Value) -> Pod {
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": "default" },
        "spec": { "nodeName": "n1", "containers": containers },
        "status": { "phase": "Running" }
    }))
    .unwrap()
}

fn service(name: &str) -> Service {
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": { "name": name, "namespace": "default" },
        "spec": { "ports": [{ "port": 80 }] }
    }))
    .unwrap()
}

fn app_with(inventory: FakeInventory, usage: FakeUsage, static_dir: &Path) -> Router {
    let state = AppState::new(Arc::new(inventory), Arc::new(usage));
    router(state, static_dir)
}

fn app(inventory: FakeInventory, usage: FakeUsage) -> Router {
    app_with(inventory, usage, Path::new("/nonexistent-static-dir"))
}

async fn get(app: Router, uri: &str) -> (StatusCode, header::HeaderMap, String) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::ORIGIN, "http://dashboard.local")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_node_metrics_joins_usage_with_capacity() {
    let inventory = FakeInventory {
        nodes: vec![node("n1", "2", "4Gi")],
        ..Default::default()
    };
    let usage = FakeUsage {
        nodes: vec![node_usage("n1", "500m", "1Gi")],
        ..Default::default()
    };

    let (status, headers, body) = get(app(inventory, usage), "/metrics/nodes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(body.starts_with("{\n    \"items\": [\n        {"));

    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        value,
        json!({
            "items": [{
                "name": "n1",
                "cpu": "500",
                "cpu_total": "2000",
                "memory": "1073741824",
                "memory_total": "4294967296"
            }]
        })
    );
}

#[tokio::test]
async fn test_node_metrics_for_node_missing_from_inventory() {
    let inventory = FakeInventory {
        nodes: vec![node("n1", "2", "4Gi")],
        ..Default::default()
    };
    let usage = FakeUsage {
        nodes: vec![
            node_usage("ghost", "1", "2Mi"),
            node_usage("n1", "100m", "1Ki"),
        ],
        ..Default::default()
    };

    let (status, _, body) = get(app(inventory, usage), "/metrics/nodes").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        value["items"][0],
        json!({
            "name": "ghost",
            "cpu": "1000",
            "cpu_total": "",
            "memory": "2097152",
            "memory_total": ""
        })
    );
    assert_eq!(value["items"][1]["cpu_total"], "2000");
    assert_eq!(value["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_node_metrics_source_failure_is_plain_text_500() {
    let usage = FakeUsage {
        unreachable: true,
        ..Default::default()
    };

    let (status, headers, body) = get(app(FakeInventory::default(), usage), "/metrics/nodes").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(
        body,
        "Kubernetes API error: list node metrics: the server could not find the requested resource"
    );
}

#[tokio::test]
async fn test_pods_carry_primary_container_limits() {
    let inventory = FakeInventory {
        pods: vec![
            pod(
                "web",
                json!([{
                    "name": "app",
                    "resources": {
                        "requests": { "cpu": "100m", "memory": "64Mi" },
                        "limits": { "cpu": "500m", "memory": "1Gi" }
                    }
                }]),
            ),
            pod("batch", json!([{ "name": "job" }])),
        ],
        ..Default::default()
    };

    let (status, headers, body) = get(app(inventory, FakeUsage::default()), "/pods").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let value: Value = serde_json::from_str(&body).unwrap();
    let items = value["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);

    assert_eq!(items[0]["metadata"]["name"], "web");
    assert_eq!(items[0]["spec"]["nodeName"], "n1");
    assert_eq!(items[0]["status"]["phase"], "Running");
    assert_eq!(
        items[0]["metrics"],
        json!({
            "name": "web",
            "cpu": "",
            "cpu_total": "500",
            "memory": "",
            "memory_total": "1073741824"
        })
    );
    assert_eq!(items[1]["metrics"]["cpu_total"], "");
    assert_eq!(items[1]["metrics"]["memory_total"], "");
}

#[tokio::test]
async fn test_pods_without_containers_fail_explicitly() {
    let inventory = FakeInventory {
        pods: vec![pod("broken", json!([]))],
        ..Default::default()
    };

    let (status, _, body) = get(app(inventory, FakeUsage::default()), "/pods").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Pod default/broken has no containers");
}

#[tokio::test]
async fn test_nodes_pass_through_list_schema() {
    let inventory = FakeInventory {
        nodes: vec![node("n1", "2", "4Gi")],
        ..Default::default()
    };

    let (status, _, body) = get(app(inventory, FakeUsage::default()), "/nodes").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["kind"], "NodeList");
    assert_eq!(value["apiVersion"], "v1");
    assert_eq!(value["items"][0]["metadata"]["name"], "n1");
    assert_eq!(value["items"][0]["status"]["allocatable"]["memory"], "4Gi");
}

#[tokio::test]
async fn test_services_send_cors_header() {
    let inventory = FakeInventory {
        services: vec![service("frontend")],
        ..Default::default()
    };

    let (status, headers, body) = get(app(inventory, FakeUsage::default()), "/services").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["kind"], "ServiceList");
    assert_eq!(value["items"][0]["metadata"]["name"], "frontend");
}

#[tokio::test]
async fn test_services_failure_propagates() {
    let inventory = FakeInventory {
        unreachable: true,
        ..Default::default()
    };

    let (status, _, body) = get(app(inventory, FakeUsage::default()), "/services").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        "Kubernetes API error: list services: connection refused"
    );
}

#[tokio::test]
async fn test_pod_metrics_pass_through_unmodified() {
    let sample: PodMetrics = serde_json::from_value(json!({
        "kind": "PodMetrics",
        "apiVersion": "metrics.k8s.io/v1beta1",
        "metadata": { "name": "web-0", "namespace": "default" },
        "timestamp": "2024-05-01T10:00:00Z",
        "window": "15s",
        "containers": [
            { "name": "app", "usage": { "cpu": "1234567n", "memory": "10Mi" } }
        ]
    }))
    .unwrap();
    let usage = FakeUsage {
        pods: vec![sample],
        ..Default::default()
    };

    let (status, headers, body) = get(app(FakeInventory::default(), usage), "/metrics/pods").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["kind"], "PodMetricsList");
    assert_eq!(
        value["items"][0]["containers"][0]["usage"],
        json!({ "cpu": "1234567n", "memory": "10Mi" })
    );
}

#[tokio::test]
async fn test_unmatched_paths_fall_back_to_static_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>dashboard</h1>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

    let (status, _, body) = get(
        app_with(FakeInventory::default(), FakeUsage::default(), dir.path()),
        "/",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>dashboard</h1>");

    let (status, _, body) = get(
        app_with(FakeInventory::default(), FakeUsage::default(), dir.path()),
        "/app.js",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log(1)");

    let (status, _, _) = get(
        app_with(FakeInventory::default(), FakeUsage::default(), dir.path()),
        "/missing.css",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_probes() {
    let (status, _, body) = get(app(FakeInventory::default(), FakeUsage::default()), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _, body) = get(app(FakeInventory::default(), FakeUsage::default()), "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let unreachable = FakeInventory {
        unreachable: true,
        ..Default::default()
    };
    let (status, _, body) = get(app(unreachable, FakeUsage::default()), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("connection refused"));
}
