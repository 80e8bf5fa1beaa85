//! Retry executor for running operations with retries.

use crate::config::RetryConfig;
use crate::error::Retryable;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// State of a retried operation.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    /// Number of attempts made (1-indexed once started).
    pub attempt: u32,
    /// Last error message.
    pub last_error: Option<String>,
    /// Total time spent waiting.
    pub total_wait_time: Duration,
    /// History of attempts.
    pub history: Vec<AttemptInfo>,
}

impl RetryState {
    /// Number of retries performed.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.attempt.saturating_sub(1)
    }
}

/// Information about a single attempt.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Attempt number.
    pub attempt: u32,
    /// Whether it succeeded.
    pub success: bool,
    /// Error message if failed.
    pub error: Option<String>,
    /// Time waited after this attempt.
    pub wait_time: Duration,
}

/// Execute an operation with retries.
///
/// # Example
///
/// ```ignore
/// use shellbay_retries::{with_retry, RetryConfig};
///
/// let config = RetryConfig::for_api();
/// let stream = with_retry(&config, || generator.stream_generate(prompt, &history)).await?;
/// ```
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    with_retry_state(config, operation).await.0
}

/// Execute with retries and return the attempt history.
pub async fn with_retry_state<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> (Result<T, E>, RetryState)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut state = RetryState::default();
    let max_attempts = config.max_retries.saturating_add(1);

    loop {
        state.attempt += 1;

        match operation().await {
            Ok(value) => {
                state.history.push(AttemptInfo {
                    attempt: state.attempt,
                    success: true,
                    error: None,
                    wait_time: Duration::ZERO,
                });
                return (Ok(value), state);
            }
            Err(error) => {
                let message = error.to_string();
                let should_retry =
                    state.attempt < max_attempts && config.retry_on.should_retry(&error);

                if !should_retry {
                    if config.is_enabled() {
                        warn!(
                            attempt = state.attempt,
                            error = %message,
                            "Retries exhausted or error not retryable"
                        );
                    }
                    state.history.push(AttemptInfo {
                        attempt: state.attempt,
                        success: false,
                        error: Some(message.clone()),
                        wait_time: Duration::ZERO,
                    });
                    state.last_error = Some(message);
                    return (Err(error), state);
                }

                let wait = config.delay_for(state.attempt, &error);
                state.total_wait_time += wait;
                state.history.push(AttemptInfo {
                    attempt: state.attempt,
                    success: false,
                    error: Some(message.clone()),
                    wait_time: wait,
                });

                debug!(
                    attempt = state.attempt,
                    wait_ms = wait.as_millis() as u64,
                    error = %message,
                    "Waiting before retry"
                );
                state.last_error = Some(message);

                if !wait.is_zero() {
                    sleep(wait).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryCondition;
    use std::sync::atomic::{AtomicU32, Ordering};
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum TestError {
        #[error("unavailable")]
        Unavailable,
        #[error("bad request")]
        BadRequest,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Unavailable)
        }

        fn status(&self) -> Option<u16> {
            match self {
                TestError::Unavailable => Some(503),
                TestError::BadRequest => Some(400),
            }
        }
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let config = RetryConfig::for_api();
        let (result, state) =
            with_retry_state(&config, || async { Ok::<_, TestError>("ok") }).await;
        assert_eq!(tokio_test::assert_ok!(result), "ok");
        assert_eq!(state.attempt, 1);
        assert_eq!(state.retries(), 0);
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::new().max_retries(3);

        let result = with_retry(&config, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TestError::Unavailable)
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_default_config_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let (result, state) = with_retry_state(&RetryConfig::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(TestError::Unavailable) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.last_error.as_deref(), Some("unavailable"));
    }

    #[tokio::test]
    async fn test_non_retryable_stops_immediately() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::new().max_retries(5);

        let result = with_retry(&config, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(TestError::BadRequest) }
        })
        .await;

        assert!(matches!(result, Err(TestError::BadRequest)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_status_condition_overrides_classification() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::new()
            .max_retries(1)
            .retry_on(RetryCondition::only_status([400]));

        let (_, state) = with_retry_state(&config, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(TestError::BadRequest) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.history.len(), 2);
        assert!(state.history.iter().all(|a| !a.success));
    }

    #[tokio::test]
    async fn test_fixed_wait_is_accumulated() {
        let config = RetryConfig::new()
            .max_retries(2)
            .fixed(Duration::from_millis(1));

        let (_, state) =
            with_retry_state(&config, || async { Err::<(), _>(TestError::Unavailable) }).await;

        assert_eq!(state.attempt, 3);
        assert_eq!(state.total_wait_time, Duration::from_millis(2));
    }
}
