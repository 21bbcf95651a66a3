use crate::logging::format_duration;
use std::convert::Infallible;
use std::time::Duration;

/// Error returned by deadline-wrapped calls
///
/// `E` is the wrapped callable's own error type. Callables that cannot fail
/// use the default `Infallible`, leaving only the deadline's own failures.
#[derive(Debug)]
pub enum DeadlineError<E = Infallible> {
    /// The call did not finish before the deadline
    Timeout {
        /// Name of the wrapped call
        name: String,
        /// Configured deadline
        after: Duration,
    },
    /// The call finished in time but returned an error
    Failed(E),
    /// The worker thread could not be started
    Spawn(std::io::Error),
}

impl<E> DeadlineError<E> {
    /// Whether the deadline elapsed before the call returned
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeadlineError::Timeout { .. })
    }

    /// Take the callable's own error, if that is what this is
    pub fn into_failed(self) -> Option<E> {
        match self {
            DeadlineError::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl DeadlineError<Infallible> {
    /// Reinterpret an infallible deadline error under another error type
    pub fn widen<E>(self) -> DeadlineError<E> {
        match self {
            DeadlineError::Timeout { name, after } => DeadlineError::Timeout { name, after },
            DeadlineError::Spawn(e) => DeadlineError::Spawn(e),
            DeadlineError::Failed(never) => match never {},
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for DeadlineError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeadlineError::Timeout { name, after } => {
                write!(f, "{} timed out after {}", name, format_duration(*after))
            }
            DeadlineError::Failed(e) => write!(f, "Call failed: {}", e),
            DeadlineError::Spawn(e) => write!(f, "Failed to spawn deadline worker: {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for DeadlineError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeadlineError::Failed(e) => Some(e),
            DeadlineError::Spawn(e) => Some(e),
            DeadlineError::Timeout { .. } => None,
        }
    }
}
