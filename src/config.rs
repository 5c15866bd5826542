use std::path::PathBuf;

use clap::Parser;

// ============================================
// Environment variable name constants
// ============================================
pub mod env {
    pub const KUBECONFIG: &str = "KUBECONFIG";
    pub const PORT: &str = "PORT";
    pub const STATIC_DIR: &str = "STATIC_DIR";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    /// Injected into every pod by the kubelet; its presence means we run in-cluster.
    pub const IN_CLUSTER_HOST: &str = "KUBERNETES_SERVICE_HOST";
}

/// How the process authenticates against the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterAuth {
    /// Service-account token mounted into the pod.
    InCluster,
    /// Credentials read from a kubeconfig file.
    Kubeconfig(PathBuf),
}

impl std::fmt::Display for ClusterAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterAuth::InCluster => write!(f, "in-cluster"),
            ClusterAuth::Kubeconfig(path) => write!(f, "kubeconfig {}", path.display()),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "kube-dashboard-api",
    version,
    about = "Read-only HTTP API over Kubernetes inventory and live resource usage",
    long_about = "Serves nodes, pods and services from the Kubernetes API together with metrics-server usage samples, normalized to milli-CPU and bytes."
)]
pub struct Config {
    /// Path to the kubeconfig file (ignored when running in-cluster)
    #[arg(long, env = env::KUBECONFIG)]
    pub kubeconfig: Option<PathBuf>,

    /// HTTP listen port
    #[arg(long, env = env::PORT, default_value = "8282")]
    pub port: u16,

    /// Directory served for paths that match no API route
    #[arg(long, env = env::STATIC_DIR, default_value = "./static")]
    pub static_dir: PathBuf,

    /// Log format: json or pretty
    #[arg(long, env = env::LOG_FORMAT, default_value = "json")]
    pub log_format: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = env::LOG_LEVEL, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn from_args() -> Self {
        Config::parse()
    }

    /// Decide the credential source from the process environment.
    pub fn cluster_auth(&self) -> Result<ClusterAuth, String> {
        let in_cluster_host = std::env::var(env::IN_CLUSTER_HOST).ok();
        let home = std::env::var_os("HOME").map(PathBuf::from);
        self.resolve_auth(in_cluster_host.as_deref(), home)
    }

    fn resolve_auth(
        &self,
        in_cluster_host: Option<&str>,
        home: Option<PathBuf>,
    ) -> Result<ClusterAuth, String> {
        if in_cluster_host.is_some_and(|host| !host.is_empty()) {
            return Ok(ClusterAuth::InCluster);
        }

        if let Some(path) = &self.kubeconfig {
            return Ok(ClusterAuth::Kubeconfig(path.clone()));
        }

        home.filter(|h| !h.as_os_str().is_empty())
            .map(|h| ClusterAuth::Kubeconfig(h.join(".kube").join("config")))
            .ok_or_else(|| {
                "HOME is not set; pass --kubeconfig to locate cluster credentials".to_string()
            })
    }
}
