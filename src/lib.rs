pub mod config;
pub mod correlate;
pub mod error;
pub mod k8s;
pub mod logging;
pub mod quantity;
pub mod server;
