//! Logging utilities
//!
//! Call spans, call timing and formatting helpers for structured logging
//! with tracing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Log levels for call spans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Debug => debug!($($arg)+),
            LogLevel::Info => info!($($arg)+),
            LogLevel::Warn => warn!($($arg)+),
            LogLevel::Error => error!($($arg)+),
        }
    };
}

/// RAII guard that logs entry into and exit from a wrapped call
///
/// Emits an entry event on creation and an exit event carrying the elapsed
/// time when dropped, so the exit is logged on every path out of the call,
/// including early returns and unwinding.
///
/// # Example
///
/// ```rust
/// use callwrap::logging::{CallSpan, LogLevel};
///
/// fn load_index() {
///     let _span = CallSpan::with_level("load_index", LogLevel::Info);
///     // Work happens here; exit is logged when `_span` drops
/// }
/// ```
pub struct CallSpan {
    name: String,
    level: LogLevel,
    start: Instant,
}

impl CallSpan {
    /// Open a span at debug level
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_level(name, LogLevel::Debug)
    }

    /// Open a span at the given level
    pub fn with_level(name: impl Into<String>, level: LogLevel) -> Self {
        let name = name.into();
        log_at!(level, call = %name, "Entering call");

        Self {
            name,
            level,
            start: Instant::now(),
        }
    }

    /// Name of the call this span covers
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get elapsed time since the span was opened
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for CallSpan {
    fn drop(&mut self) {
        let elapsed = format_duration(self.start.elapsed());
        log_at!(self.level, call = %self.name, %elapsed, "Exiting call");
    }
}

/// Run a call and log how long it took
///
/// The exit event carries the elapsed time and is emitted even if `func`
/// panics.
///
/// # Example
///
/// ```rust
/// use callwrap::logging::timed;
///
/// let total = timed("sum_rates", || [1.5, 2.5].iter().sum::<f64>());
/// assert_eq!(total, 4.0);
/// ```
pub fn timed<F, T>(name: &str, func: F) -> T
where
    F: FnOnce() -> T,
{
    timed_with_level(name, LogLevel::Debug, func)
}

/// Run a call and log how long it took at the given level
pub fn timed_with_level<F, T>(name: &str, level: LogLevel, func: F) -> T
where
    F: FnOnce() -> T,
{
    let _span = CallSpan::with_level(name, level);
    func()
}

/// Await a future and log how long it took
///
/// ```rust,ignore
/// let body = timed_future("fetch_rates", client.get(url).send()).await;
/// ```
pub async fn timed_future<F>(name: &str, future: F) -> F::Output
where
    F: Future,
{
    timed_future_with_level(name, LogLevel::Debug, future).await
}

/// Await a future and log how long it took at the given level
pub async fn timed_future_with_level<F>(name: &str, level: LogLevel, future: F) -> F::Output
where
    F: Future,
{
    let _span = CallSpan::with_level(name, level);
    future.await
}

/// Format duration in human-readable form
///
/// # Example
///
/// ```rust
/// use callwrap::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
/// assert_eq!(format_duration(Duration::from_micros(500)), "500μs");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{}ms", micros / 1000)
    } else if micros < 60_000_000 {
        format!("{:.2}s", micros as f64 / 1_000_000.0)
    } else {
        let seconds = micros / 1_000_000;
        let minutes = seconds / 60;
        let secs = seconds % 60;
        format!("{}m{}s", minutes, secs)
    }
}
