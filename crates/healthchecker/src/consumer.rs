//! Result rendering.

use healthcheck::CheckResult;
use std::io::Write;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drains the result sink and writes one line per result
pub struct ResultConsumer<W> {
    results: mpsc::Receiver<CheckResult>,
    writer: W,
}

impl<W: Write> ResultConsumer<W> {
    /// Create a new result consumer
    pub fn new(results: mpsc::Receiver<CheckResult>, writer: W) -> Self {
        Self { results, writer }
    }

    /// Run until the sink is closed and drained, or the token is cancelled.
    ///
    /// Returns the writer so callers can inspect or reuse it.
    pub async fn run(mut self, token: CancellationToken) -> W {
        debug!("Result consumer started");
        let mut rendered = 0u64;

        loop {
            tokio::select! {
                result = self.results.recv() => match result {
                    Some(result) => {
                        self.render(&result);
                        rendered += 1;
                    }
                    None => {
                        debug!("Result sink closed");
                        break;
                    }
                },
                _ = token.cancelled() => {
                    debug!("Result consumer cancelled");
                    break;
                }
            }
        }

        info!(rendered, "Result consumer stopped");
        self.writer
    }

    fn render(&mut self, result: &CheckResult) {
        let written = writeln!(self.writer, "{result}").and_then(|_| self.writer.flush());
        if let Err(e) = written {
            warn!(url = %result.url(), error = %e, "Failed to write result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthcheck::ProbeError;
    use std::time::Duration;

    #[tokio::test]
    async fn test_renders_until_sink_closed() {
        let (tx, rx) = mpsc::channel(10);
        tx.send(CheckResult::success("http://ok.test", 200, Duration::from_millis(50)))
            .await
            .unwrap();
        tx.send(CheckResult::failure(
            "http://down.test",
            ProbeError::Connect("connection refused".to_string()),
            Duration::from_millis(2),
        ))
        .await
        .unwrap();
        drop(tx);

        let output = ResultConsumer::new(rx, Vec::new())
            .run(CancellationToken::new())
            .await;

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[SUCCESS] - [http://ok.test] Status Code: 200 | Response Time: 50ms",
                "[ERROR] - [http://down.test] Error Message: connection failed: connection refused | Response Time: 2ms",
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_on_cancel() {
        let (_tx, rx) = mpsc::channel::<CheckResult>(10);
        let token = CancellationToken::new();
        token.cancel();

        let output = tokio::time::timeout(
            Duration::from_secs(1),
            ResultConsumer::new(rx, Vec::new()).run(token),
        )
        .await
        .expect("consumer ignored cancellation");
        assert!(output.is_empty());
    }
}
