//! Fixed-delay retries for a single provider.
//!
//! Wraps any [`Provider`] so that a failed attempt is repeated a small, fixed
//! number of times with a constant pause in between. There is no exponential
//! backoff: the chain falls through to the next strategy once the attempts
//! are used up.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use bulkpaste_core::retry::{RetryPolicy, RetryingProvider};
//! # use bulkpaste_core::{ContentItem, PasteError, PublishedPaste, Provider};
//! # struct Api;
//! # #[async_trait::async_trait]
//! # impl Provider for Api {
//! #     fn name(&self) -> &str { "api" }
//! #     async fn publish(&self, _: &ContentItem) -> Result<PublishedPaste, PasteError> { todo!() }
//! # }
//!
//! // Two tries in total, one second apart.
//! let policy = RetryPolicy::new(2, Duration::from_secs(1));
//! let provider = RetryingProvider::new(Api, policy);
//! ```

use std::time::Duration;

use async_trait::async_trait;

use crate::error::PasteError;
use crate::models::{ContentItem, PublishedPaste};
use crate::traits::Provider;

/// How often and how far apart a provider is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of tries, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Constant pause between tries.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// A single try, no retries.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn tries(&self) -> u32 {
        self.attempts.max(1)
    }
}

impl Default for RetryPolicy {
    /// Two tries, one second apart.
    fn default() -> Self {
        Self {
            attempts: 2,
            delay: Duration::from_secs(1),
        }
    }
}

/// A [`Provider`] wrapper that repeats failed attempts.
///
/// Reports the inner provider's name, so a success on the second try is
/// recorded under the same method as a success on the first.
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: Provider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<P: Provider> Provider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn publish(&self, item: &ContentItem) -> Result<PublishedPaste, PasteError> {
        let tries = self.policy.tries();
        let mut attempt = 1;
        loop {
            match self.inner.publish(item).await {
                Ok(paste) => return Ok(paste),
                Err(e) if attempt < tries && !e.is_skip() => {
                    tracing::debug!(
                        provider = %self.inner.name(),
                        row = item.row,
                        attempt,
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    if !self.policy.delay.is_zero() {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
