//! Common error types for the health checker.

use std::fmt;

/// A specialized Result type for health checker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for health checker operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Worker pool error: {0}")]
    Pool(String),

    #[error("Task error: {0}")]
    Task(String),
}

impl Error {
    /// Create a new worker pool error.
    pub fn pool(msg: impl fmt::Display) -> Self {
        Error::Pool(msg.to_string())
    }

    /// Create a new task error (a spawned task panicked or was aborted).
    pub fn task(msg: impl fmt::Display) -> Self {
        Error::Task(msg.to_string())
    }
}
