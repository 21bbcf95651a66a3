//! Deadline-enforced calls
//!
//! A [`Deadline`] runs a callable against a wall-clock budget. Blocking
//! callables run on a dedicated worker thread while the caller waits with a
//! join-with-timeout; futures run under `tokio::time::timeout`. Either way
//! the caller gets the callable's result unchanged if it arrives in time and
//! [`DeadlineError::Timeout`] if it does not.
//!
//! Every invocation owns its countdown. There is no process-wide timer or
//! signal handler, so deadlines may be nested and used from many threads at
//! once.
//!
//! # Example
//!
//! ```rust
//! use callwrap::{with_deadline, DeadlineError};
//! use std::time::Duration;
//!
//! let print_hello = with_deadline(Duration::from_secs(2))
//!     .named("print_hello")
//!     .wrap(|()| {
//!         std::thread::sleep(Duration::from_millis(50));
//!         "Hello"
//!     });
//! assert_eq!(print_hello.call(()).unwrap(), "Hello");
//!
//! let too_slow = with_deadline(Duration::from_millis(10)).call(|| {
//!     std::thread::sleep(Duration::from_millis(200));
//! });
//! assert!(matches!(too_slow, Err(DeadlineError::Timeout { .. })));
//! ```
//!
//! A timed-out worker thread is detached, not killed: it keeps running until
//! the callable returns. Use [`Deadline::call_cancellable`] for work that
//! can notice a [`CancelToken`] and stop early.

mod cancel;
mod error;
mod future;
mod guard;

pub use cancel::CancelToken;
pub use error::DeadlineError;
pub use guard::{Budget, DeadlineGuard};

use crate::config::WrapConfig;
use crate::logging::{format_duration, CallSpan, LogLevel};
use std::any::Any;
use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

const UNNAMED_CALL: &str = "call";

/// Create a deadline of `duration` for wrapping callables
///
/// Shorthand for [`Deadline::new`].
pub fn with_deadline(duration: Duration) -> Deadline {
    Deadline::new(duration)
}

/// Wall-clock budget applied to wrapped calls
///
/// Cloning is cheap. Clones share the armed-countdown counter reported by
/// [`Deadline::armed`].
#[derive(Debug, Clone)]
pub struct Deadline {
    duration: Duration,
    name: Option<Arc<str>>,
    level: LogLevel,
    worker_name: Arc<str>,
    armed: Arc<AtomicUsize>,
}

impl Deadline {
    /// Create a deadline with the given duration
    ///
    /// A zero duration is already expired: calls fail with
    /// [`DeadlineError::Timeout`] without the callable being started.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            name: None,
            level: LogLevel::default(),
            worker_name: Arc::from(WrapConfig::DEFAULT_WORKER_NAME),
            armed: Arc::default(),
        }
    }

    /// Create a deadline of whole seconds
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Create a deadline from configuration
    pub fn from_config(config: &WrapConfig) -> Self {
        Self::new(config.deadline())
            .with_log_level(config.log_level)
            .with_worker_name(config.worker_name.clone())
    }

    /// Name the wrapped call for logs and timeout errors
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Arc::from(name.into()));
        self
    }

    /// Set the level of the call's entry/exit events
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the name of the worker threads blocking calls run on
    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = Arc::from(name.into());
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_CALL)
    }

    /// Number of countdowns currently armed on this deadline and its clones
    pub fn armed(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }

    /// Arm a countdown of this deadline's duration
    pub fn arm(&self) -> DeadlineGuard {
        DeadlineGuard::arm(self.duration, Arc::clone(&self.armed))
    }

    /// Turn a callable into a reusable deadline-enforced callable
    ///
    /// The callable takes a single argument value; use a tuple for several
    /// arguments and `()` for none.
    pub fn wrap<F>(self, func: F) -> DeadlineFn<F> {
        DeadlineFn {
            deadline: self,
            func: Arc::new(func),
        }
    }

    /// Run a one-shot callable under this deadline
    pub fn call<F, T>(&self, func: F) -> Result<T, DeadlineError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.call_cancellable(move |_| func())
    }

    /// Run a fallible one-shot callable under this deadline
    ///
    /// An `Err` returned in time is passed through as
    /// [`DeadlineError::Failed`].
    pub fn try_call<F, T, E>(&self, func: F) -> Result<T, DeadlineError<E>>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        match self.call(func) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(DeadlineError::Failed(error)),
            Err(error) => Err(error.widen()),
        }
    }

    /// Run a callable that receives a [`CancelToken`]
    ///
    /// The token is cancelled when the deadline expires. A panic in the
    /// callable is resumed on the caller's thread.
    pub fn call_cancellable<F, T>(&self, func: F) -> Result<T, DeadlineError>
    where
        F: FnOnce(CancelToken) -> T + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.arm();
        let _span = CallSpan::with_level(self.name(), self.level);

        let budget = guard.budget();
        if budget == Budget::Expired {
            return Err(self.expired());
        }

        let token = CancelToken::new();
        let worker_token = token.clone();
        let (tx, rx) = mpsc::sync_channel(1);

        let spawned = thread::Builder::new()
            .name(self.worker_name.to_string())
            .spawn(move || {
                // Nobody is listening any more if the deadline already passed
                let _ = tx.send(func(worker_token));
            });
        let worker = match spawned {
            Ok(handle) => handle,
            Err(error) => return Err(DeadlineError::Spawn(error)),
        };

        let received = match budget {
            Budget::Within(left) => rx.recv_timeout(left),
            Budget::Expired | Budget::Unbounded => {
                rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
            }
        };

        match received {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Timeout) => {
                token.cancel();
                Err(self.expired())
            }
            Err(RecvTimeoutError::Disconnected) => {
                // The sender only drops unsent when the callable unwinds
                let payload: Box<dyn Any + Send> = match worker.join() {
                    Err(payload) => payload,
                    Ok(()) => Box::new("deadline worker exited without a result"),
                };
                panic::resume_unwind(payload)
            }
        }
    }

    fn expired<E>(&self) -> DeadlineError<E> {
        warn!(
            call = %self.name(),
            deadline = %format_duration(self.duration),
            "Call exceeded its deadline"
        );
        DeadlineError::Timeout {
            name: self.name().to_string(),
            after: self.duration,
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::from_config(&WrapConfig::default())
    }
}

/// A callable bound to a [`Deadline`]
///
/// Produced by [`Deadline::wrap`]. Each invocation arms its own countdown.
pub struct DeadlineFn<F> {
    deadline: Deadline,
    func: Arc<F>,
}

impl<F> DeadlineFn<F> {
    /// The deadline applied to each invocation
    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    /// Invoke the wrapped callable
    pub fn call<A, R>(&self, args: A) -> Result<R, DeadlineError>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        A: Send + 'static,
        R: Send + 'static,
    {
        let func = Arc::clone(&self.func);
        self.deadline.call(move || func(args))
    }

    /// Invoke a wrapped callable that returns `Result`
    pub fn try_call<A, T, E>(&self, args: A) -> Result<T, DeadlineError<E>>
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        A: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let func = Arc::clone(&self.func);
        self.deadline.try_call(move || func(args))
    }
}

impl<F> Clone for DeadlineFn<F> {
    fn clone(&self) -> Self {
        Self {
            deadline: self.deadline.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<F> std::fmt::Debug for DeadlineFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineFn")
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
