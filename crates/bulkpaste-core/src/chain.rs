use std::time::Duration;

use crate::error::PasteError;
use crate::models::{ContentItem, PublishResult, PublishedPaste};
use crate::traits::Provider;

/// Ordered list of publishing strategies tried for one item.
///
/// Attempts run strictly one after another and stop at the first success.
/// Every failure (transport, parse, missing capability) falls through to the
/// next provider; once the list is exhausted the collected errors become a
/// single [`PublishResult::Failure`]. Nothing is returned as `Err`, so one bad
/// item never aborts a batch.
pub struct ProviderChain {
    providers: Vec<Box<dyn Provider>>,
    attempt_timeout: Option<Duration>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self {
            providers,
            attempt_timeout: None,
        }
    }

    /// Upper bound on any single attempt, on top of the providers' own timeouts.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Appends a provider at the end of the chain.
    pub fn push(&mut self, provider: Box<dyn Provider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in attempt order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Try each provider in order, returning the first success.
    pub async fn publish(&self, item: &ContentItem) -> PublishResult {
        if self.providers.is_empty() {
            return PublishResult::failure("no providers configured");
        }

        let mut failures: Vec<String> = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let name = provider.name();
            tracing::debug!(row = item.row, provider = %name, "Trying provider");

            match self.attempt(provider.as_ref(), item).await {
                Ok(paste) => {
                    tracing::info!(
                        row = item.row,
                        provider = %name,
                        url = %paste.url,
                        "Published"
                    );
                    return PublishResult::success(paste, name);
                }
                Err(e) if e.is_skip() => {
                    tracing::debug!(row = item.row, provider = %name, error = %e, "Provider skipped");
                    failures.push(format!("{name}: skipped ({e})"));
                }
                Err(e) if !e.is_fallthrough() => {
                    tracing::error!(
                        row = item.row,
                        provider = %name,
                        kind = e.kind(),
                        error = %e,
                        "Provider is misconfigured, moving on"
                    );
                    failures.push(format!("{name}: {e}"));
                }
                Err(e) => {
                    tracing::warn!(
                        row = item.row,
                        provider = %name,
                        kind = e.kind(),
                        error = %e,
                        "Provider failed, falling through"
                    );
                    failures.push(format!("{name}: {e}"));
                }
            }
        }

        PublishResult::failure(format!(
            "all {} providers failed: {}",
            self.providers.len(),
            failures.join("; ")
        ))
    }

    async fn attempt(
        &self,
        provider: &dyn Provider,
        item: &ContentItem,
    ) -> Result<PublishedPaste, PasteError> {
        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, provider.publish(item))
                .await
                .unwrap_or_else(|_| Err(PasteError::Timeout(whole_secs(limit)))),
            None => provider.publish(item).await,
        }
    }
}

/// Seconds for error messages, rounded up so sub-second budgets never read as zero.
fn whole_secs(limit: Duration) -> u64 {
    limit.as_secs() + u64::from(limit.subsec_nanos() > 0)
}
