//! Retry configuration.

use crate::error::Retryable;
use std::time::Duration;

/// Configuration for retry behavior.
///
/// The default never retries.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Wait strategy.
    pub wait: WaitStrategy,
    /// Retry condition.
    pub retry_on: RetryCondition,
    /// Upper bound on a server-suggested `Retry-After` delay.
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            wait: WaitStrategy::None,
            retry_on: RetryCondition::default(),
            max_retry_after: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Create a config that never retries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for [`RetryConfig::new`].
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new()
    }

    /// Config for provider calls: three retries with jittered exponential
    /// backoff on transient failures.
    #[must_use]
    pub fn for_api() -> Self {
        Self::new()
            .max_retries(3)
            .exponential_jitter(Duration::from_millis(500), Duration::from_secs(30), 0.1)
    }

    /// Set max retries.
    #[must_use]
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the wait strategy.
    #[must_use]
    pub fn wait(mut self, strategy: WaitStrategy) -> Self {
        self.wait = strategy;
        self
    }

    /// Use a fixed delay.
    #[must_use]
    pub fn fixed(self, delay: Duration) -> Self {
        self.wait(WaitStrategy::Fixed(delay))
    }

    /// Use exponential backoff.
    #[must_use]
    pub fn exponential(self, initial: Duration, max: Duration) -> Self {
        self.wait(WaitStrategy::Exponential {
            initial,
            max,
            multiplier: 2.0,
        })
    }

    /// Use exponential backoff with jitter.
    #[must_use]
    pub fn exponential_jitter(self, initial: Duration, max: Duration, jitter: f64) -> Self {
        self.wait(WaitStrategy::ExponentialJitter {
            initial,
            max,
            multiplier: 2.0,
            jitter: jitter.clamp(0.0, 1.0),
        })
    }

    /// Set retry condition.
    #[must_use]
    pub fn retry_on(mut self, condition: RetryCondition) -> Self {
        self.retry_on = condition;
        self
    }

    /// Cap server-suggested delays.
    #[must_use]
    pub fn max_retry_after(mut self, max: Duration) -> Self {
        self.max_retry_after = max;
        self
    }

    /// Whether this config can ever retry.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Delay before retry number `attempt` (1-indexed) after `error`.
    pub fn delay_for<E: Retryable + ?Sized>(&self, attempt: u32, error: &E) -> Duration {
        match error.retry_after() {
            Some(hint) => hint.min(self.max_retry_after),
            None => self.wait.calculate(attempt),
        }
    }
}

/// Strategy for waiting between retries.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitStrategy {
    /// Retry immediately.
    None,
    /// Fixed delay.
    Fixed(Duration),
    /// Exponential backoff.
    Exponential {
        /// Initial delay.
        initial: Duration,
        /// Maximum delay.
        max: Duration,
        /// Multiplier for each attempt.
        multiplier: f64,
    },
    /// Exponential backoff with jitter.
    ExponentialJitter {
        /// Initial delay.
        initial: Duration,
        /// Maximum delay.
        max: Duration,
        /// Multiplier for each attempt.
        multiplier: f64,
        /// Jitter factor (0.0 to 1.0).
        jitter: f64,
    },
}

impl WaitStrategy {
    /// Calculate the wait for a given attempt (1-indexed).
    #[must_use]
    pub fn calculate(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(30) as i32;
        match self {
            WaitStrategy::None => Duration::ZERO,
            WaitStrategy::Fixed(d) => *d,
            WaitStrategy::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let delay = initial.as_secs_f64() * multiplier.powi(exponent);
                bounded_secs(delay, *max)
            }
            WaitStrategy::ExponentialJitter {
                initial,
                max,
                multiplier,
                jitter,
            } => {
                let base = initial.as_secs_f64() * multiplier.powi(exponent);
                let delay = base + base * jitter * random_jitter();
                bounded_secs(delay, *max)
            }
        }
    }
}

/// Seconds to a duration within `[0, max]`. NaN maps to zero.
fn bounded_secs(delay: f64, max: Duration) -> Duration {
    if delay.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(delay.clamp(0.0, max.as_secs_f64()))
}

/// Which failures get retried.
#[derive(Debug, Clone)]
pub struct RetryCondition {
    /// HTTP statuses that are always retried.
    pub on_status_codes: Vec<u16>,
    /// Whether to trust the error's own [`Retryable::is_retryable`].
    pub on_retryable: bool,
}

impl Default for RetryCondition {
    fn default() -> Self {
        Self {
            on_status_codes: Vec::new(),
            on_retryable: true,
        }
    }
}

impl RetryCondition {
    /// A condition that only retries errors classified as retryable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A condition that only retries the listed statuses.
    #[must_use]
    pub fn only_status(codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            on_status_codes: codes.into_iter().collect(),
            on_retryable: false,
        }
    }

    /// Add statuses to retry on.
    #[must_use]
    pub fn on_status(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.on_status_codes.extend(codes);
        self
    }

    /// Check if an error should be retried.
    pub fn should_retry<E: Retryable + ?Sized>(&self, error: &E) -> bool {
        if let Some(status) = error.status() {
            if self.on_status_codes.contains(&status) {
                return true;
            }
        }
        self.on_retryable && error.is_retryable()
    }
}

/// Random factor in `-1.0..1.0`.
fn random_jitter() -> f64 {
    use rand::Rng;
    rand::thread_rng().gen_range(-1.0..1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Http(u16);

    impl Retryable for Http {
        fn is_retryable(&self) -> bool {
            self.0 == 429 || self.0 >= 500
        }

        fn status(&self) -> Option<u16> {
            Some(self.0)
        }
    }

    struct Limited(Duration);

    impl Retryable for Limited {
        fn is_retryable(&self) -> bool {
            true
        }

        fn retry_after(&self) -> Option<Duration> {
            Some(self.0)
        }
    }

    #[test]
    fn test_default_never_retries() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 0);
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_for_api() {
        let config = RetryConfig::for_api();
        assert_eq!(config.max_retries, 3);
        assert!(matches!(config.wait, WaitStrategy::ExponentialJitter { .. }));
    }

    #[rstest]
    #[case(1, 100)]
    #[case(2, 200)]
    #[case(3, 400)]
    #[case(10, 1000)]
    fn test_exponential(#[case] attempt: u32, #[case] millis: u64) {
        let strategy = WaitStrategy::Exponential {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(1),
            multiplier: 2.0,
        };
        assert_eq!(strategy.calculate(attempt), Duration::from_millis(millis));
    }

    #[rstest]
    #[case(-2.0)]
    #[case(f64::NAN)]
    #[case(f64::NEG_INFINITY)]
    fn test_exponential_bad_multiplier_is_zero_or_bounded(#[case] multiplier: f64) {
        let max = Duration::from_secs(10);
        let exponential = WaitStrategy::Exponential {
            initial: Duration::from_millis(100),
            max,
            multiplier,
        };
        let jittered = WaitStrategy::ExponentialJitter {
            initial: Duration::from_millis(100),
            max,
            multiplier,
            jitter: 0.5,
        };

        for attempt in 1..=4 {
            assert!(exponential.calculate(attempt) <= max);
            assert!(jittered.calculate(attempt) <= max);
        }
        assert_eq!(exponential.calculate(2), Duration::ZERO);
    }

    #[test]
    fn test_infinite_multiplier_caps_at_max() {
        let strategy = WaitStrategy::Exponential {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(3),
            multiplier: f64::INFINITY,
        };
        assert_eq!(strategy.calculate(3), Duration::from_secs(3));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let strategy = WaitStrategy::ExponentialJitter {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(1),
            multiplier: 2.0,
            jitter: 0.5,
        };
        for _ in 0..50 {
            let wait = strategy.calculate(2);
            assert!(wait >= Duration::from_millis(100));
            assert!(wait <= Duration::from_millis(300));
        }
    }

    #[rstest]
    #[case(429, true)]
    #[case(500, true)]
    #[case(503, true)]
    #[case(400, false)]
    #[case(401, false)]
    fn test_default_condition(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(RetryCondition::new().should_retry(&Http(status)), expected);
    }

    #[test]
    fn test_only_status_condition() {
        let condition = RetryCondition::only_status([503]);
        assert!(condition.should_retry(&Http(503)));
        assert!(!condition.should_retry(&Http(500)));
    }

    #[test]
    fn test_retry_after_is_capped() {
        let config = RetryConfig::new()
            .fixed(Duration::from_millis(5))
            .max_retry_after(Duration::from_secs(2));
        assert_eq!(
            config.delay_for(1, &Limited(Duration::from_secs(10))),
            Duration::from_secs(2)
        );
        assert_eq!(config.delay_for(1, &Http(500)), Duration::from_millis(5));
    }
}
