//! # shellbay-retries
//!
//! Caller-side retry policy for shellbay.
//!
//! Generators never retry on their own. A caller that wants resilience wraps
//! the call that *opens* a generation in [`with_retry`], so a retry can never
//! replay chunks that were already delivered.
//!
//! ## Example
//!
//! ```ignore
//! use shellbay_retries::{with_retry, RetryConfig};
//! use std::time::Duration;
//!
//! let config = RetryConfig::new()
//!     .max_retries(2)
//!     .exponential(Duration::from_millis(200), Duration::from_secs(5));
//!
//! let stream = with_retry(&config, || generator.stream_generate(prompt, &history)).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod executor;

pub use config::{RetryCondition, RetryConfig, WaitStrategy};
pub use error::Retryable;
pub use executor::{with_retry, with_retry_state, AttemptInfo, RetryState};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{with_retry, RetryCondition, RetryConfig, Retryable, WaitStrategy};
}
