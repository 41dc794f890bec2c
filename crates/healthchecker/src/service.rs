//! Lifecycle coordination: wires the pool, generator and consumer together
//! and drives an ordered shutdown.

use crate::consumer::ResultConsumer;
use crate::generator::JobGenerator;
use healthcheck::{HttpProber, PoolConfig, PoolStats, Prober, WorkerPool};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runtime configuration of the service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// URLs to probe on every round
    pub urls: Vec<String>,

    /// Worker pool sizing
    pub pool: PoolConfig,

    /// Result sink capacity
    pub result_capacity: usize,

    /// Probe timeout
    pub timeout: Duration,

    /// Interval between rounds
    pub interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            pool: PoolConfig::default(),
            result_capacity: 100,
            timeout: Duration::from_secs(3),
            interval: Duration::from_secs(20),
        }
    }
}

/// What a finished run produced
#[derive(Debug)]
pub struct RunSummary<W> {
    /// Writer the results were rendered to
    pub output: W,

    /// Rounds issued by the generator
    pub bursts: u64,

    /// Final pool counters
    pub stats: PoolStats,
}

/// Health checker service
pub struct HealthcheckService {
    config: ServiceConfig,
    prober: Option<Arc<dyn Prober>>,
}

impl HealthcheckService {
    /// Create a new service probing over HTTP
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            prober: None,
        }
    }

    /// Use a custom prober instead of HTTP
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = Some(prober);
        self
    }

    /// Run until `shutdown` resolves.
    ///
    /// Results are written to `output`, one line each. When this returns,
    /// every task started by the service has exited.
    pub async fn run<W, F>(self, output: W, shutdown: F) -> common::Result<RunSummary<W>>
    where
        W: Write + Send + 'static,
        F: Future<Output = ()>,
    {
        info!(
            urls = self.config.urls.len(),
            workers = self.config.pool.worker_count,
            timeout = ?self.config.timeout,
            interval = ?self.config.interval,
            "Starting health checker"
        );

        let prober: Arc<dyn Prober> = match self.prober {
            Some(prober) => prober,
            None => Arc::new(HttpProber::new(self.config.timeout).map_err(common::Error::pool)?),
        };

        let (results_tx, results_rx) = mpsc::channel(self.config.result_capacity);
        let pool = Arc::new(
            WorkerPool::with_prober(self.config.pool, prober, results_tx)
                .map_err(common::Error::pool)?,
        );
        pool.init().await.map_err(common::Error::pool)?;

        let generator_token = CancellationToken::new();
        let consumer_token = CancellationToken::new();

        let generator = JobGenerator::new(pool.clone(), self.config.urls, self.config.interval);
        let generator_handle = tokio::spawn(generator.run(generator_token.clone()));

        let consumer = ResultConsumer::new(results_rx, output);
        let consumer_handle = tokio::spawn(consumer.run(consumer_token.clone()));

        info!("All tasks spawned, health checker running");
        shutdown.await;
        info!("Shutdown requested");

        // Stop producing before the queue closes
        generator_token.cancel();
        let bursts = match generator_handle.await {
            Ok(bursts) => bursts,
            Err(e) => {
                warn!(error = %e, "Job generator task failed");
                0
            }
        };

        // Closes the result sink once every worker has exited
        let stopped = pool.stop().await;
        if stopped.is_err() {
            // Sink may still be open; don't leave the consumer waiting on it
            consumer_token.cancel();
        }

        // The consumer drains in-flight results and ends on the closed sink
        let output = consumer_handle
            .await
            .map_err(|e| common::Error::task(format!("result consumer failed: {e}")))?;
        let stats = stopped.map_err(common::Error::pool)?;

        if let Ok(text) = pool.metrics().encode() {
            debug!(metrics = %text, "Final metrics");
        }
        info!(
            bursts,
            queued = stats.queued,
            completed = stats.completed,
            failed = stats.failed,
            dropped = stats.dropped,
            abandoned = stats.abandoned,
            "Health checker stopped"
        );

        Ok(RunSummary {
            output,
            bursts,
            stats,
        })
    }
}
