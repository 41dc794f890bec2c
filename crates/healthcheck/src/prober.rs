//! Probe implementations.

use crate::types::{CheckResult, Job, ProbeError};
use async_trait::async_trait;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Performs a single check for a job.
///
/// Implementations never retry and never fail: every failure is reported in
/// the returned [`CheckResult`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe the job's target
    async fn probe(&self, job: &Job) -> CheckResult;
}

/// HTTP GET prober with a fixed timeout
pub struct HttpProber {
    client: reqwest::Client,
    timeout_duration: Duration,
}

impl HttpProber {
    /// Create a new HTTP prober
    pub fn new(timeout_duration: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout_duration)
            .build()?;

        Ok(Self {
            client,
            timeout_duration,
        })
    }

    fn classify(&self, err: &reqwest::Error) -> ProbeError {
        let message = error_chain(err);
        if err.is_timeout() {
            ProbeError::Timeout(self.timeout_duration)
        } else if err.is_builder() {
            ProbeError::InvalidUrl(message)
        } else if err.is_connect() {
            ProbeError::Connect(message)
        } else {
            ProbeError::Request(message)
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, job: &Job) -> CheckResult {
        let start = Instant::now();

        let request = self.client.get(&job.url);

        match timeout(self.timeout_duration, request.send()).await {
            Ok(Ok(response)) => {
                let duration = start.elapsed();
                let status_code = response.status().as_u16();
                debug!(url = %job.url, status = status_code, duration_ms = duration.as_millis(),
                       "HTTP probe completed");
                CheckResult::success(&job.url, status_code, duration)
            }
            Ok(Err(e)) => {
                let duration = start.elapsed();
                let error = self.classify(&e);
                warn!(url = %job.url, error = %error, duration_ms = duration.as_millis(), "HTTP probe failed");
                CheckResult::failure(&job.url, error, duration)
            }
            Err(_) => {
                let duration = start.elapsed();
                warn!(url = %job.url, duration_ms = duration.as_millis(), "HTTP probe timed out");
                CheckResult::failure(&job.url, ProbeError::Timeout(self.timeout_duration), duration)
            }
        }
    }
}

/// Render an error with its sources, e.g. `error sending request: tcp connect error: Connection refused`.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_error_chain() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "tcp connect error",
                Some(Box::new(Layer("Connection refused", None))),
            ))),
        );
        assert_eq!(
            error_chain(&err),
            "error sending request: tcp connect error: Connection refused"
        );
    }

    #[tokio::test]
    async fn test_http_prober_connection_refused() {
        // Nothing listens on port 1
        let prober = HttpProber::new(Duration::from_millis(500)).unwrap();

        let result = prober.probe(&Job::new("http://127.0.0.1:1/health")).await;
        assert!(!result.is_success());
        assert_eq!(result.status_code(), None);
        assert!(result.response_time() <= Duration::from_millis(700));
    }

    #[tokio::test]
    async fn test_http_prober_malformed_url() {
        let prober = HttpProber::new(Duration::from_millis(500)).unwrap();

        let result = prober.probe(&Job::new("not a url")).await;
        assert!(matches!(result.error(), Some(ProbeError::InvalidUrl(_))));
        assert_eq!(result.status_code(), None);
        assert_eq!(result.url(), "not a url");
    }
}
