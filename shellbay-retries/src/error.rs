//! Error classification for retries.

use std::time::Duration;

/// Classification an error type exposes to the retry executor.
///
/// Implementors only describe the failure; whether to retry is decided by a
/// [`RetryCondition`](crate::RetryCondition).
pub trait Retryable {
    /// Whether the failure is transient on its own terms (connection loss,
    /// timeout, rate limit, server error).
    fn is_retryable(&self) -> bool;

    /// HTTP status, if the failure came from an HTTP response.
    fn status(&self) -> Option<u16> {
        None
    }

    /// Server-suggested delay before trying again.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl<E: Retryable + ?Sized> Retryable for &E {
    fn is_retryable(&self) -> bool {
        (**self).is_retryable()
    }

    fn status(&self) -> Option<u16> {
        (**self).status()
    }

    fn retry_after(&self) -> Option<Duration> {
        (**self).retry_after()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Status(u16);

    impl Retryable for Status {
        fn is_retryable(&self) -> bool {
            self.0 >= 500
        }

        fn status(&self) -> Option<u16> {
            Some(self.0)
        }
    }

    #[test]
    fn test_defaults() {
        let err = Status(503);
        assert!(err.is_retryable());
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_reference_forwarding() {
        let err = Status(404);
        let by_ref = &err;
        assert!(!by_ref.is_retryable());
        assert_eq!(by_ref.status(), Some(404));
    }
}
