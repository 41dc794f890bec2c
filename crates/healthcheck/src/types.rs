//! Health check types and structures.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// One unit of work: probe this URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    /// Target URL
    pub url: String,
}

impl Job {
    /// Create a job for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Why a probe did not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// No response within the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection could not be established (refused, DNS failure, TLS)
    #[error("connection failed: {0}")]
    Connect(String),

    /// The target could not be turned into a request
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Any other transport failure
    #[error("request failed: {0}")]
    Request(String),

    /// The prober panicked while handling the job
    #[error("prober panicked: {0}")]
    Panicked(String),
}

/// Outcome of processing a [`Job`].
///
/// Holds either the HTTP status code or the failure reason, never both.
/// `response_time` is always measured, including for failed probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    url: String,
    outcome: Result<u16, ProbeError>,
    response_time: Duration,
}

impl CheckResult {
    /// Create a result for a probe that received a response
    pub fn success(url: impl Into<String>, status_code: u16, response_time: Duration) -> Self {
        Self {
            url: url.into(),
            outcome: Ok(status_code),
            response_time,
        }
    }

    /// Create a result for a probe that failed
    pub fn failure(url: impl Into<String>, error: ProbeError, response_time: Duration) -> Self {
        Self {
            url: url.into(),
            outcome: Err(error),
            response_time,
        }
    }

    /// Probed URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP status code, when a response was received
    pub fn status_code(&self) -> Option<u16> {
        self.outcome.as_ref().ok().copied()
    }

    /// Failure reason, when no response was received
    pub fn error(&self) -> Option<&ProbeError> {
        self.outcome.as_ref().err()
    }

    /// Wall-clock time spent on the request
    pub fn response_time(&self) -> Duration {
        self.response_time
    }

    /// Check if a response was received
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(code) => write!(
                f,
                "[SUCCESS] - [{}] Status Code: {} | Response Time: {:?}",
                self.url, code, self.response_time
            ),
            Err(error) => write!(
                f,
                "[ERROR] - [{}] Error Message: {} | Response Time: {:?}",
                self.url, error, self.response_time
            ),
        }
    }
}

/// Worker pool lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Constructed, no workers launched
    Created,
    /// Workers are accepting jobs
    Running,
    /// Shutdown signalled, waiting for workers to exit
    Stopping,
    /// All workers exited and the result sink is closed
    Stopped,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolState::Created => write!(f, "CREATED"),
            PoolState::Running => write!(f, "RUNNING"),
            PoolState::Stopping => write!(f, "STOPPING"),
            PoolState::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// What happened to a pushed job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Enqueued for a worker
    Queued,
    /// Queue was full; the job was discarded
    Dropped,
    /// Pool is not running; the job was ignored
    Rejected,
}

/// Snapshot of worker pool counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Jobs accepted into the queue
    pub queued: u64,

    /// Jobs discarded because the queue was full
    pub dropped: u64,

    /// Jobs pushed while the pool was not running
    pub rejected: u64,

    /// Probes that produced a result
    pub completed: u64,

    /// Completed probes that carried an error
    pub failed: u64,

    /// Probes currently running
    pub in_flight: u64,

    /// Jobs still queued when the pool stopped
    pub abandoned: u64,
}
