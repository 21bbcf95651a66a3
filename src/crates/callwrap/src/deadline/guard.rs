use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What is left of a countdown when a call is about to wait on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// The countdown has already elapsed
    Expired,
    /// Wait at most this long
    Within(Duration),
    /// The deadline lies beyond what `Instant` can represent; wait without a timeout
    Unbounded,
}

/// RAII countdown for one deadline-wrapped invocation
///
/// Creating the guard arms the countdown and increments the owning
/// deadline's armed counter; dropping it disarms. Because disarming happens
/// in `Drop`, it runs on success, error, timeout and unwinding alike.
///
/// # Example
///
/// ```rust
/// use callwrap::with_deadline;
/// use std::time::Duration;
///
/// let deadline = with_deadline(Duration::from_secs(10));
/// {
///     let guard = deadline.arm();
///     assert_eq!(deadline.armed(), 1);
///     assert!(!guard.is_expired());
/// }
/// assert_eq!(deadline.armed(), 0);
/// ```
#[derive(Debug)]
pub struct DeadlineGuard {
    /// `None` when `now + duration` overflows `Instant`
    expires_at: Option<Instant>,
    duration: Duration,
    armed: Arc<AtomicUsize>,
}

impl DeadlineGuard {
    pub(crate) fn arm(duration: Duration, armed: Arc<AtomicUsize>) -> Self {
        armed.fetch_add(1, Ordering::SeqCst);
        Self {
            expires_at: Instant::now().checked_add(duration),
            duration,
            armed,
        }
    }

    /// Check if the countdown has elapsed
    pub fn is_expired(&self) -> bool {
        self.budget() == Budget::Expired
    }

    /// Time left before the countdown elapses
    ///
    /// Returns None once it has elapsed, and `Duration::MAX` for an
    /// unbounded countdown
    pub fn remaining(&self) -> Option<Duration> {
        match self.budget() {
            Budget::Expired => None,
            Budget::Within(left) => Some(left),
            Budget::Unbounded => Some(Duration::MAX),
        }
    }

    /// Classify the time left for a caller about to wait
    pub fn budget(&self) -> Budget {
        let Some(expires_at) = self.expires_at else {
            return Budget::Unbounded;
        };
        let now = Instant::now();
        if now >= expires_at {
            Budget::Expired
        } else {
            Budget::Within(expires_at.duration_since(now))
        }
    }

    /// The duration the countdown was armed with
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        self.armed.fetch_sub(1, Ordering::SeqCst);
    }
}
