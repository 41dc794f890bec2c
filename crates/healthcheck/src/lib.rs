//! Concurrent HTTP health checking.
//!
//! This crate provides the execution engine of the health checker:
//! - [`Prober`]: one HTTP GET with a fixed timeout, always timed
//! - [`WorkerPool`]: a bounded job queue served by a fixed number of workers
//! - [`PoolMetrics`]: Prometheus counters for queue and probe activity
//!
//! # Features
//!
//! - Async/await based, one tokio task per worker
//! - Drop-on-full backpressure: pushing never waits for queue space
//! - Deterministic shutdown: signal, close input, wait for workers, close output
//!
//! # Example
//!
//! ```no_run
//! use healthcheck::{Job, WorkerPool};
//! use std::time::Duration;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (results_tx, mut results_rx) = mpsc::channel(100);
//! let pool = WorkerPool::new(3, Duration::from_secs(3), results_tx)?;
//! pool.init().await?;
//!
//! pool.push(Job::new("https://example.com")).await;
//! if let Some(result) = results_rx.recv().await {
//!     println!("{result}");
//! }
//!
//! pool.stop().await?;
//! assert!(results_rx.recv().await.is_none());
//! # Ok(())
//! # }
//! ```

pub mod metrics;
pub mod pool;
pub mod prober;
pub mod types;

pub use metrics::PoolMetrics;
pub use pool::{PoolConfig, PoolError, WorkerPool};
pub use prober::{HttpProber, Prober};
pub use types::{CheckResult, Job, PoolState, PoolStats, ProbeError, PushOutcome};
