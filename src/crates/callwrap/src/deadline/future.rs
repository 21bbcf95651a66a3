//! Async deadlines on tokio
//!
//! Futures are cancelled by dropping them, so unlike blocking calls nothing
//! keeps running once the deadline passes.

use super::{Budget, Deadline, DeadlineError};
use crate::logging::CallSpan;
use std::future::Future;

impl Deadline {
    /// Await a future under this deadline
    ///
    /// # Example
    ///
    /// ```rust
    /// use callwrap::with_deadline;
    /// use std::time::Duration;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let deadline = with_deadline(Duration::from_millis(10));
    /// let result = deadline
    ///     .run(tokio::time::sleep(Duration::from_secs(10)))
    ///     .await;
    ///
    /// assert!(result.unwrap_err().is_timeout());
    /// # }
    /// ```
    pub async fn run<F>(&self, future: F) -> Result<F::Output, DeadlineError>
    where
        F: Future,
    {
        let guard = self.arm();
        let _span = CallSpan::with_level(self.name(), self.level);

        match guard.budget() {
            // tokio polls the future once before checking the timer
            Budget::Expired => Err(self.expired()),
            Budget::Within(left) => match tokio::time::timeout(left, future).await {
                Ok(output) => Ok(output),
                Err(_elapsed) => Err(self.expired()),
            },
            Budget::Unbounded => Ok(future.await),
        }
    }

    /// Await a fallible future under this deadline
    ///
    /// An `Err` produced in time is passed through as
    /// [`DeadlineError::Failed`].
    pub async fn try_run<F, T, E>(&self, future: F) -> Result<T, DeadlineError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        match self.run(future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(DeadlineError::Failed(error)),
            Err(error) => Err(error.widen()),
        }
    }
}
