//! Bounded convergence polling.
//!
//! Every wait in this crate states its postcondition: a
//! [`ConvergenceCheck`] pairs a description with a timeout and poll
//! interval, and [`converge`] polls an async predicate until it holds or
//! the budget runs out. Nothing here loops unboundedly.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::result::{ComprarError, ComprarResult};

/// Default convergence timeout (5 seconds)
pub const DEFAULT_CONVERGENCE_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// A predicate over observable UI state with an explicit budget
#[derive(Debug, Clone)]
pub struct ConvergenceCheck {
    /// Total budget for the poll
    pub timeout: Duration,
    /// Interval between probes
    pub poll_interval: Duration,
    /// What the poll is waiting for (used in errors and logs)
    pub description: String,
}

impl ConvergenceCheck {
    /// Create a check with default budget and interval
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_CONVERGENCE_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            description: description.into(),
        }
    }

    /// Set the total budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Successful convergence
#[derive(Debug, Clone, Copy)]
pub struct Converged {
    /// Time spent polling
    pub elapsed: Duration,
}

/// Poll `probe` until it returns true or the check's budget is exhausted.
///
/// The probe is evaluated immediately, then on each poll interval. Probe
/// errors propagate; budget exhaustion yields
/// [`ComprarError::ConvergenceExhausted`], never a silent success.
///
/// # Errors
///
/// Any error from the probe, or `ConvergenceExhausted` on budget expiry.
pub async fn converge<F, Fut>(check: &ConvergenceCheck, mut probe: F) -> ComprarResult<Converged>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ComprarResult<bool>>,
{
    let start = Instant::now();
    loop {
        if probe().await? {
            let elapsed = start.elapsed();
            tracing::debug!(check = %check.description, ?elapsed, "converged");
            return Ok(Converged { elapsed });
        }
        if start.elapsed() >= check.timeout {
            return Err(ComprarError::ConvergenceExhausted {
                description: check.description.clone(),
                ms: check.timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(check.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_converge_immediate_success() {
        let check = ConvergenceCheck::new("already true");
        let result = converge(&check, || async { Ok(true) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_converge_after_some_polls() {
        let check = ConvergenceCheck::new("third probe")
            .with_timeout(Duration::from_secs(1))
            .with_poll_interval(Duration::from_millis(50));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let result = converge(&check, move || {
            let counter = Arc::clone(&counter);
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) >= 2) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_converge_budget_exhaustion_is_an_error() {
        let check = ConvergenceCheck::new("never true")
            .with_timeout(Duration::from_millis(300))
            .with_poll_interval(Duration::from_millis(50));

        let result = converge(&check, || async { Ok(false) }).await;
        match result {
            Err(ComprarError::ConvergenceExhausted { description, ms }) => {
                assert_eq!(description, "never true");
                assert_eq!(ms, 300);
            }
            other => panic!("expected ConvergenceExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_error_propagates() {
        let check = ConvergenceCheck::new("probe fails");
        let result = converge(&check, || async {
            Err(ComprarError::Page {
                message: "lost page".to_string(),
            })
        })
        .await;
        assert!(matches!(result, Err(ComprarError::Page { .. })));
    }

    #[test]
    fn test_check_builder() {
        let check = ConvergenceCheck::new("cart empty")
            .with_timeout(Duration::from_secs(10))
            .with_poll_interval(Duration::from_millis(250));
        assert_eq!(check.timeout, Duration::from_secs(10));
        assert_eq!(check.poll_interval, Duration::from_millis(250));
        assert_eq!(check.description, "cart empty");
    }
}
