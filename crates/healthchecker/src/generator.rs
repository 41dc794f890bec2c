//! Periodic job generation.

use healthcheck::{Job, PushOutcome, WorkerPool};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Enqueues one job per configured URL immediately and then on every tick
pub struct JobGenerator {
    pool: Arc<WorkerPool>,
    urls: Vec<String>,
    interval: Duration,
}

impl JobGenerator {
    /// Create a new job generator
    pub fn new(pool: Arc<WorkerPool>, urls: Vec<String>, interval: Duration) -> Self {
        Self {
            pool,
            urls,
            interval,
        }
    }

    /// Run until cancelled; returns the number of bursts issued.
    ///
    /// Cancellation is observed between bursts, never in the middle of one.
    pub async fn run(self, token: CancellationToken) -> u64 {
        info!(urls = self.urls.len(), interval = ?self.interval, "Job generator started");

        let mut bursts = 0u64;
        let mut tick = interval(self.interval);
        // A stalled round is not made up for
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tick.tick().await; // Skip first immediate tick

        // First round goes out without waiting for the interval
        self.burst().await;
        bursts += 1;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!(bursts, "Job generator stopping");
                    break;
                }
                _ = tick.tick() => {
                    self.burst().await;
                    bursts += 1;
                }
            }
        }

        bursts
    }

    /// Push one job per URL
    async fn burst(&self) {
        let mut queued = 0usize;
        let mut dropped = 0usize;
        let mut rejected = 0usize;

        for url in &self.urls {
            match self.pool.push(Job::new(url.clone())).await {
                PushOutcome::Queued => queued += 1,
                PushOutcome::Dropped => dropped += 1,
                PushOutcome::Rejected => rejected += 1,
            }
        }

        debug!(queued, dropped, rejected, "Job burst enqueued");
    }
}
