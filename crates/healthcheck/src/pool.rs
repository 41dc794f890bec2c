//! Bounded worker pool.
//!
//! A fixed number of worker tasks pull [`Job`]s from a bounded queue, probe
//! them and forward each [`CheckResult`] to a caller-owned result sink.
//!
//! Shutdown always runs in the same order: signal the workers, close the job
//! queue, wait for every worker to exit, then close the result sink. A worker
//! that is mid-probe finishes (or times out) before it exits; jobs still in the
//! queue are abandoned, not probed.

use crate::metrics::PoolMetrics;
use crate::prober::{HttpProber, Prober};
use crate::types::{CheckResult, Job, PoolState, PoolStats, ProbeError, PushOutcome};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default job queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default number of worker loops
pub const DEFAULT_WORKER_COUNT: usize = 3;

/// Worker pool error types
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot {operation} a pool in state {state}")]
    InvalidState {
        operation: &'static str,
        state: PoolState,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of concurrent worker loops
    pub worker_count: usize,

    /// Maximum number of pending jobs
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PoolConfig {
    fn validate(&self) -> Result<(), PoolError> {
        if self.worker_count == 0 {
            return Err(PoolError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fixed-size pool of probing workers
pub struct WorkerPool {
    config: PoolConfig,
    prober: Arc<dyn Prober>,

    /// Write side of the job queue; `None` once closed
    job_tx: RwLock<Option<mpsc::Sender<Job>>>,
    /// Read side of the job queue, shared by all workers
    job_rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    /// Result sink; `None` once closed
    result_tx: RwLock<Option<mpsc::Sender<CheckResult>>>,

    state: RwLock<PoolState>,
    shutdown: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    metrics: Arc<PoolMetrics>,
}

impl WorkerPool {
    /// Create a pool of `worker_count` HTTP probers with the given timeout.
    ///
    /// Nothing runs until [`WorkerPool::init`] is called.
    pub fn new(
        worker_count: usize,
        timeout: Duration,
        results: mpsc::Sender<CheckResult>,
    ) -> Result<Self, PoolError> {
        let config = PoolConfig {
            worker_count,
            ..PoolConfig::default()
        };
        config.validate()?;

        let prober = Arc::new(HttpProber::new(timeout)?);
        Ok(Self::build(config, prober, results))
    }

    /// Create a pool around an existing prober
    pub fn with_prober(
        config: PoolConfig,
        prober: Arc<dyn Prober>,
        results: mpsc::Sender<CheckResult>,
    ) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self::build(config, prober, results))
    }

    fn build(
        config: PoolConfig,
        prober: Arc<dyn Prober>,
        results: mpsc::Sender<CheckResult>,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel(config.queue_capacity);

        Self {
            config,
            prober,
            job_tx: RwLock::new(Some(job_tx)),
            job_rx: Arc::new(Mutex::new(job_rx)),
            result_tx: RwLock::new(Some(results)),
            state: RwLock::new(PoolState::Created),
            shutdown: CancellationToken::new(),
            workers: Mutex::new(Vec::with_capacity(config.worker_count)),
            metrics: Arc::new(PoolMetrics::new()),
        }
    }

    /// Launch the worker loops
    pub async fn init(&self) -> Result<(), PoolError> {
        let mut state = self.state.write().await;
        if *state != PoolState::Created {
            return Err(PoolError::InvalidState {
                operation: "init",
                state: *state,
            });
        }

        let result_tx = self
            .result_tx
            .read()
            .await
            .clone()
            .ok_or(PoolError::InvalidState {
                operation: "init",
                state: *state,
            })?;

        let mut workers = self.workers.lock().await;
        for id in 1..=self.config.worker_count {
            let worker = Worker {
                id,
                prober: self.prober.clone(),
                jobs: self.job_rx.clone(),
                results: result_tx.clone(),
                shutdown: self.shutdown.clone(),
                metrics: self.metrics.clone(),
            };
            self.metrics.worker_started();
            workers.push(tokio::spawn(worker.run()));
        }

        *state = PoolState::Running;
        info!(
            workers = self.config.worker_count,
            queue_capacity = self.config.queue_capacity,
            "Worker pool started"
        );
        Ok(())
    }

    /// Enqueue a job without waiting for queue space
    pub async fn push(&self, job: Job) -> PushOutcome {
        if *self.state.read().await != PoolState::Running {
            self.metrics.record_rejected();
            debug!(url = %job.url, "Pool not running, ignoring job");
            return PushOutcome::Rejected;
        }

        let job_tx = self.job_tx.read().await;
        let Some(tx) = job_tx.as_ref() else {
            self.metrics.record_rejected();
            return PushOutcome::Rejected;
        };

        match tx.try_send(job) {
            Ok(()) => {
                self.metrics.record_queued();
                PushOutcome::Queued
            }
            Err(TrySendError::Full(job)) => {
                self.metrics.record_dropped();
                warn!(url = %job.url, "Job queue is full, dropping job");
                PushOutcome::Dropped
            }
            Err(TrySendError::Closed(job)) => {
                self.metrics.record_rejected();
                debug!(url = %job.url, "Job queue closed, ignoring job");
                PushOutcome::Rejected
            }
        }
    }

    /// Stop the pool and close the result sink.
    ///
    /// Returns once every worker has exited. Calling it on a pool that is not
    /// running is an error.
    pub async fn stop(&self) -> Result<PoolStats, PoolError> {
        {
            let mut state = self.state.write().await;
            if *state != PoolState::Running {
                return Err(PoolError::InvalidState {
                    operation: "stop",
                    state: *state,
                });
            }
            *state = PoolState::Stopping;
        }
        info!("Stopping worker pool");

        // Signal, then close the input side
        self.shutdown.cancel();
        drop(self.job_tx.write().await.take());

        // Wait for every worker; in-flight probes complete first
        let handles = std::mem::take(&mut *self.workers.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task failed");
            }
        }

        // Whatever is left in the queue was never dispatched
        let abandoned = {
            let mut job_rx = self.job_rx.lock().await;
            let mut count = 0u64;
            while job_rx.try_recv().is_ok() {
                count += 1;
            }
            count
        };
        if abandoned > 0 {
            self.metrics.record_abandoned(abandoned);
            info!(abandoned, "Discarded queued jobs on shutdown");
        }

        // No worker holds a sender any more; closing ours ends the stream
        drop(self.result_tx.write().await.take());

        *self.state.write().await = PoolState::Stopped;
        let stats = self.metrics.snapshot();
        info!(
            completed = stats.completed,
            failed = stats.failed,
            dropped = stats.dropped,
            abandoned = stats.abandoned,
            "Worker pool stopped"
        );
        Ok(stats)
    }

    /// Current lifecycle state
    pub async fn state(&self) -> PoolState {
        *self.state.read().await
    }

    /// Current counters
    pub fn stats(&self) -> PoolStats {
        self.metrics.snapshot()
    }

    /// Pool metrics registry
    pub fn metrics(&self) -> Arc<PoolMetrics> {
        self.metrics.clone()
    }

    pub fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    pub fn queue_capacity(&self) -> usize {
        self.config.queue_capacity
    }
}

/// A single worker loop
struct Worker {
    id: usize,
    prober: Arc<dyn Prober>,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    results: mpsc::Sender<CheckResult>,
    shutdown: CancellationToken,
    metrics: Arc<PoolMetrics>,
}

impl Worker {
    async fn run(self) {
        debug!(worker = self.id, "Worker started");

        while let Some(job) = self.next_job().await {
            self.metrics.probe_started();
            let result = self.probe(&job).await;
            self.metrics.probe_finished(&result);

            if let Err(e) = self.results.send(result).await {
                warn!(worker = self.id, url = %e.0.url(), "Result sink closed, discarding result");
            }
        }

        self.metrics.worker_stopped();
        debug!(worker = self.id, "Worker finished processing");
    }

    /// Run the prober; a panic becomes a failed result and the loop survives it.
    async fn probe(&self, job: &Job) -> CheckResult {
        let start = Instant::now();
        match AssertUnwindSafe(self.prober.probe(job)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(&*panic);
                error!(worker = self.id, url = %job.url, panic = %message, "Prober panicked");
                CheckResult::failure(
                    &job.url,
                    ProbeError::Panicked(message.to_string()),
                    start.elapsed(),
                )
            }
        }
    }

    /// Wait for the next job; `None` on shutdown or when the queue is closed and empty.
    async fn next_job(&self) -> Option<Job> {
        let mut jobs = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return None,
            guard = self.jobs.lock() => guard,
        };

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            job = jobs.recv() => job,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
