use anyhow::Result;
use tracing::{error, info};

use kube_dashboard_api::config::Config;
use kube_dashboard_api::k8s::{InventorySource, KubeSource, build_client};
use kube_dashboard_api::logging;
use kube_dashboard_api::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args();

    logging::init(&config.log_format, &config.log_level);

    let auth = match config.cluster_auth() {
        Ok(auth) => auth,
        Err(e) => {
            error!(error = %e, "Configuration validation failed");
            std::process::exit(1);
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        auth = %auth,
        port = config.port,
        "kube-dashboard-api starting"
    );

    let client = match build_client(&auth).await {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create Kubernetes client");
            std::process::exit(1);
        }
    };

    let source = KubeSource::new(client);
    match source.server_version().await {
        Ok(version) => info!(server_version = %version, "Connected to Kubernetes API"),
        Err(e) => {
            error!(error = %e, "Kubernetes API unreachable");
            std::process::exit(1);
        }
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
        }
    });

    let result = server::run(&config, AppState::from_kube(source), shutdown_rx).await;

    if let Err(e) = result {
        error!(error = %e, "Application error");
        std::process::exit(1);
    }

    info!("Shutdown complete");
    Ok(())
}
