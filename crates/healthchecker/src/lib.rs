//! Health checker - periodic HTTP endpoint probing
//!
//! Probes a configured list of URLs on a fixed interval and prints one line
//! per result with the status code and response time.
//!
//! # Components
//!
//! - **Generator**: enqueues one job per URL every interval
//! - **Worker pool**: probes jobs concurrently (see the `healthcheck` crate)
//! - **Consumer**: renders results as they arrive
//! - **Service**: wires the above and drives an ordered shutdown

pub mod config;
pub mod consumer;
pub mod generator;
pub mod service;

pub use config::{Config, ConfigError};
pub use consumer::ResultConsumer;
pub use generator::JobGenerator;
pub use service::{HealthcheckService, RunSummary, ServiceConfig};

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
