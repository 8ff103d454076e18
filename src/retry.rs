//! # Retry Executor
//!
//! Bounded retries with a fixed delay in front of every capability call.
//!
//! Each attempt first takes one fault from the capability's [`FaultInjector`]. When a fault
//! is pending the attempt fails with it and the real call is skipped; an empty list means the
//! operation actually runs. Errors are classified by a predicate (by default
//! [`ServiceError::is_retryable`]): retryable errors sleep `delay` and try again while attempts
//! remain, anything else ends the run immediately.

use crate::services::{FaultInjector, ServiceError};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone, Copy)]
pub struct Retry {
    max_attempts: u32,
    delay: Duration,
    retryable: fn(&ServiceError) -> bool,
}

impl fmt::Debug for Retry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Retry {
    /// `max_attempts` counts the first call; it is raised to one if zero.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            retryable: ServiceError::is_retryable,
        }
    }

    pub fn with_predicate(mut self, retryable: fn(&ServiceError) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Runs `op` until it succeeds, fails terminally, or the attempt budget is spent.
    ///
    /// Returns the last error in the two failure cases.
    pub async fn run<T, F, Fut>(
        &self,
        faults: &FaultInjector,
        mut op: F,
    ) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = match faults.next().await {
                Some(fault) => Err(fault),
                None => op().await,
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if (self.retryable)(&e) && attempt < self.max_attempts => {
                    debug!(attempt, error = %e, "Retrying after delay");
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Giving up");
                    return Err(e);
                }
            }
        }
    }

    /// Callback form of [`Retry::run`]: `on_error` is awaited exactly once with the last error
    /// and the executor returns normally.
    pub async fn perform<T, F, Fut, H, HFut>(
        &self,
        faults: &FaultInjector,
        op: F,
        on_error: H,
    ) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
        H: FnOnce(ServiceError) -> HFut,
        HFut: Future<Output = ()>,
    {
        match self.run(faults, op).await {
            Ok(value) => Some(value),
            Err(e) => {
                on_error(e).await;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn unavailable() -> ServiceError {
        ServiceError::Unavailable(ServiceKind::Payment)
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_injected_faults() {
        let retry = Retry::new(3, Duration::from_secs(30));
        let faults = FaultInjector::new([unavailable(), unavailable()]);
        let calls = Arc::new(AtomicU32::new(0));

        let started = tokio::time::Instant::now();
        let result = retry
            .run(&faults, || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ServiceError>("txn")
                }
            })
            .await;

        assert_eq!(result, Ok("txn"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_return_last_error() {
        let retry = Retry::new(2, Duration::from_secs(1));
        let faults = FaultInjector::new([unavailable(), unavailable(), unavailable()]);

        let result: Result<(), _> = retry.run(&faults, || async { Ok(()) }).await;

        assert_eq!(result, Err(unavailable()));
        assert_eq!(faults.remaining().await, 1);
    }

    #[tokio::test]
    async fn test_terminal_error_stops_immediately() {
        let retry = Retry::new(5, Duration::from_secs(1));
        let faults = FaultInjector::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry
            .run(&faults, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ServiceError::PaymentDetailsInvalid) }
            })
            .await;

        assert_eq!(result, Err(ServiceError::PaymentDetailsInvalid));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_perform_calls_handler_once() {
        let retry = Retry::new(3, Duration::ZERO).with_predicate(|_| true);
        let faults = FaultInjector::new([
            ServiceError::PaymentDetailsInvalid,
            ServiceError::PaymentDetailsInvalid,
            ServiceError::PaymentDetailsInvalid,
        ]);
        let handled = AtomicU32::new(0);

        let result: Option<()> = retry
            .perform(
                &faults,
                || async { Ok(()) },
                |e| {
                    assert_eq!(e, ServiceError::PaymentDetailsInvalid);
                    handled.fetch_add(1, Ordering::SeqCst);
                    async {}
                },
            )
            .await;

        assert_eq!(result, None);
        assert_eq!(handled.load(Ordering::SeqCst), 1);
    }
}
