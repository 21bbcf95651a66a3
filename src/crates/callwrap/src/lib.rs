//! Call wrappers for deadlines and memoization
//!
//! This crate wraps ordinary callables with two behaviours:
//!
//! - [`with_deadline`] runs a call against a wall-clock budget and fails with
//!   a timeout error if the budget is exhausted first.
//! - [`memoize`] caches results per exact argument value so repeated calls
//!   with equal arguments are answered without recomputing.
//!
//! # Modules
//!
//! - `deadline` - Deadline-enforced calls, blocking and async
//! - `memoize` - Memoizing wrapper with hit/miss statistics
//! - `config` - Configuration management with environment variable loading
//! - `logging` - Call spans, call timing and duration formatting for structured logs
//!
//! # Example
//!
//! ```rust
//! use callwrap::{memoize, with_deadline};
//! use std::time::Duration;
//!
//! let product = memoize(|(a, b): (i64, i64)| a * b);
//! assert_eq!(product.call((2, 3)), 6);
//! assert_eq!(product.call((2, 3)), 6);
//! assert_eq!(product.stats().misses, 1);
//!
//! let hello = with_deadline(Duration::from_secs(2))
//!     .named("hello")
//!     .wrap(|name: String| format!("Hello, {}", name));
//! assert_eq!(hello.call("world".to_string()).unwrap(), "Hello, world");
//! ```

pub mod config;
pub mod deadline;
pub mod logging;
pub mod memoize;

pub use deadline::{with_deadline, CancelToken, Deadline, DeadlineError, DeadlineFn};
pub use memoize::{memoize, try_memoize, CacheStats, Memoized};

use thiserror::Error;

/// Errors that can occur in the callwrap crate
#[derive(Debug, Error)]
pub enum CallwrapError {
    /// Invalid or unparsable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for callwrap operations
pub type Result<T> = std::result::Result<T, CallwrapError>;

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
