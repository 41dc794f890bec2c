//! Prometheus metrics for the worker pool.
//!
//! The registry is never served over the network; counters are read back by
//! [`PoolMetrics::snapshot`] and can be rendered with [`PoolMetrics::encode`]
//! for logging.

use crate::types::{CheckResult, PoolStats};
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Labels for check result metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CheckLabels {
    /// Result (success, failure)
    pub result: String,
}

impl CheckLabels {
    fn success() -> Self {
        Self {
            result: "success".to_string(),
        }
    }

    fn failure() -> Self {
        Self {
            result: "failure".to_string(),
        }
    }
}

/// Metrics registry with all worker pool metrics
pub struct PoolMetrics {
    /// Prometheus registry
    pub registry: Registry,

    /// Jobs accepted into the queue
    jobs_queued_total: Counter,
    /// Jobs discarded because the queue was full
    jobs_dropped_total: Counter,
    /// Jobs pushed while the pool was not running
    jobs_rejected_total: Counter,
    /// Jobs left in the queue at shutdown
    jobs_abandoned_total: Counter,
    /// Completed probes by result
    checks_total: Family<CheckLabels, Counter>,
    /// Probe response time
    response_time_seconds: Histogram,
    /// Probes currently running
    in_flight: Gauge,
    /// Live worker loops
    workers_active: Gauge,
}

impl PoolMetrics {
    /// Create a new metrics registry
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let jobs_queued_total = Counter::default();
        registry.register(
            "healthcheck_jobs_queued",
            "Jobs accepted into the job queue",
            jobs_queued_total.clone(),
        );

        let jobs_dropped_total = Counter::default();
        registry.register(
            "healthcheck_jobs_dropped",
            "Jobs dropped because the job queue was full",
            jobs_dropped_total.clone(),
        );

        let jobs_rejected_total = Counter::default();
        registry.register(
            "healthcheck_jobs_rejected",
            "Jobs pushed while the pool was not running",
            jobs_rejected_total.clone(),
        );

        let jobs_abandoned_total = Counter::default();
        registry.register(
            "healthcheck_jobs_abandoned",
            "Jobs still queued when the pool stopped",
            jobs_abandoned_total.clone(),
        );

        let checks_total = Family::<CheckLabels, Counter>::default();
        registry.register(
            "healthcheck_checks",
            "Completed health checks by result",
            checks_total.clone(),
        );

        // Exponential buckets from 1ms to ~16s
        let response_time_seconds = Histogram::new(exponential_buckets(0.001, 2.0, 15));
        registry.register(
            "healthcheck_response_time_seconds",
            "Health check response time in seconds",
            response_time_seconds.clone(),
        );

        let in_flight = Gauge::default();
        registry.register(
            "healthcheck_in_flight",
            "Probes currently running",
            in_flight.clone(),
        );

        let workers_active = Gauge::default();
        registry.register(
            "healthcheck_workers_active",
            "Number of live worker loops",
            workers_active.clone(),
        );

        Self {
            registry,
            jobs_queued_total,
            jobs_dropped_total,
            jobs_rejected_total,
            jobs_abandoned_total,
            checks_total,
            response_time_seconds,
            in_flight,
            workers_active,
        }
    }

    pub fn record_queued(&self) {
        self.jobs_queued_total.inc();
    }

    pub fn record_dropped(&self) {
        self.jobs_dropped_total.inc();
    }

    pub fn record_rejected(&self) {
        self.jobs_rejected_total.inc();
    }

    pub fn record_abandoned(&self, count: u64) {
        self.jobs_abandoned_total.inc_by(count);
    }

    /// Mark a probe as started
    pub fn probe_started(&self) {
        self.in_flight.inc();
    }

    /// Mark a probe as finished and record its result
    pub fn probe_finished(&self, result: &CheckResult) {
        self.in_flight.dec();

        let labels = if result.is_success() {
            CheckLabels::success()
        } else {
            CheckLabels::failure()
        };
        self.checks_total.get_or_create(&labels).inc();
        self.response_time_seconds
            .observe(result.response_time().as_secs_f64());
    }

    pub fn worker_started(&self) {
        self.workers_active.inc();
    }

    pub fn worker_stopped(&self) {
        self.workers_active.dec();
    }

    /// Number of live worker loops
    pub fn workers_active(&self) -> i64 {
        self.workers_active.get()
    }

    /// Number of jobs dropped on a full queue
    pub fn jobs_dropped(&self) -> u64 {
        self.jobs_dropped_total.get()
    }

    /// Read all counters
    pub fn snapshot(&self) -> PoolStats {
        let successes = self.checks_total.get_or_create(&CheckLabels::success()).get();
        let failures = self.checks_total.get_or_create(&CheckLabels::failure()).get();

        PoolStats {
            queued: self.jobs_queued_total.get(),
            dropped: self.jobs_dropped_total.get(),
            rejected: self.jobs_rejected_total.get(),
            completed: successes + failures,
            failed: failures,
            in_flight: self.in_flight.get().max(0) as u64,
            abandoned: self.jobs_abandoned_total.get(),
        }
    }

    /// Encode metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}
