//! Common utilities and types shared across the health checker crates.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
