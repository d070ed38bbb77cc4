use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::chain::ProviderChain;
use crate::error::PasteError;
use crate::markdown;
use crate::models::{BatchSummary, ContentItem, PublishRecord, PublishResult};
use crate::traits::OutcomeRecorder;
use crate::validate::ContentValidator;

/// Events emitted by the batch runner for progress reporting.
#[derive(Debug, Clone)]
pub enum BatchEvent<'a> {
    Started {
        total: usize,
        providers: &'a [&'a str],
    },
    ItemSkipped {
        row: usize,
        reason: &'a str,
    },
    ItemDispatched {
        row: usize,
    },
    ItemPublished {
        row: usize,
        url: &'a str,
        method: &'a str,
    },
    ItemFailed {
        row: usize,
        error: &'a str,
    },
    Pausing {
        delay: Duration,
    },
    Cancelled {
        processed: usize,
    },
    Finished {
        summary: &'a BatchSummary,
    },
}

/// Trait for receiving batch events (decoupled logging / progress display).
pub trait BatchReporter: Send + Sync {
    fn report(&self, event: BatchEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBatchReporter;

impl BatchReporter for TracingBatchReporter {
    fn report(&self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::Started { total, providers } => {
                tracing::info!(%total, chain = %providers.join(" -> "), "Batch started");
            }
            BatchEvent::ItemSkipped { row, reason } => {
                tracing::warn!(%row, %reason, "Row skipped");
            }
            BatchEvent::ItemDispatched { row } => {
                tracing::debug!(%row, "Dispatching row");
            }
            BatchEvent::ItemPublished { row, url, method } => {
                tracing::info!(%row, %url, %method, "Row published");
            }
            BatchEvent::ItemFailed { row, error } => {
                tracing::warn!(%row, %error, "Row failed");
            }
            BatchEvent::Pausing { delay } => {
                tracing::debug!(delay_ms = %delay.as_millis(), "Pausing before next submission");
            }
            BatchEvent::Cancelled { processed } => {
                tracing::warn!(%processed, "Batch cancelled");
            }
            BatchEvent::Finished { summary } => {
                tracing::info!(
                    total = summary.total,
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    skipped = summary.skipped,
                    "Batch finished"
                );
            }
        }
    }
}

/// Per-run options for the batch loop.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Pause between two consecutive submissions.
    pub delay: Duration,
    /// Flatten Markdown before validation.
    pub normalize_markdown: bool,
    pub validator: ContentValidator,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            normalize_markdown: false,
            validator: ContentValidator::default(),
        }
    }
}

impl BatchOptions {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_markdown_normalization(mut self, enabled: bool) -> Self {
        self.normalize_markdown = enabled;
        self
    }

    pub fn with_validator(mut self, validator: ContentValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Apply the optional Markdown pass, producing the text that gets validated.
    pub fn prepare(&self, item: &ContentItem) -> ContentItem {
        if self.normalize_markdown {
            item.with_text(markdown::normalize(&item.text))
        } else {
            item.clone()
        }
    }
}

/// Runs items through normalize → validate → dispatch → record, one at a time.
///
/// Rejected rows never reach the network. A pause of `delay` precedes every
/// submission that follows an earlier one, so there is no pause before the
/// first submission or after the last.
pub struct BatchRunner {
    chain: ProviderChain,
    options: BatchOptions,
}

impl BatchRunner {
    pub fn new(chain: ProviderChain, options: BatchOptions) -> Self {
        Self { chain, options }
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Process all items in order until done or cancelled.
    ///
    /// Only a failing recorder aborts the run; provider failures are recorded
    /// as failed rows.
    pub async fn run<R, BR>(
        &self,
        items: &[ContentItem],
        recorder: &mut R,
        reporter: &BR,
        cancel_token: &CancellationToken,
    ) -> Result<BatchSummary, PasteError>
    where
        R: OutcomeRecorder,
        BR: BatchReporter,
    {
        let providers = self.chain.names();
        reporter.report(BatchEvent::Started {
            total: items.len(),
            providers: &providers,
        });

        let mut summary = BatchSummary::default();
        let mut submitted_any = false;

        for item in items {
            if cancel_token.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let item = self.options.prepare(item);

            let record = match self.options.validator.check(&item.text) {
                Err(rejection) => {
                    let reason = PasteError::from(rejection).to_string();
                    reporter.report(BatchEvent::ItemSkipped {
                        row: item.row,
                        reason: &reason,
                    });
                    PublishRecord::skipped(item.row, reason)
                }
                Ok(()) => {
                    if submitted_any && !self.options.delay.is_zero() {
                        reporter.report(BatchEvent::Pausing {
                            delay: self.options.delay,
                        });
                        tokio::select! {
                            () = tokio::time::sleep(self.options.delay) => {}
                            () = cancel_token.cancelled() => {
                                summary.cancelled = true;
                                break;
                            }
                        }
                    }
                    submitted_any = true;

                    reporter.report(BatchEvent::ItemDispatched { row: item.row });
                    let result = self.chain.publish(&item).await;
                    match &result {
                        PublishResult::Success { url, method, .. } => {
                            reporter.report(BatchEvent::ItemPublished {
                                row: item.row,
                                url,
                                method,
                            });
                        }
                        PublishResult::Failure { reason } => {
                            reporter.report(BatchEvent::ItemFailed {
                                row: item.row,
                                error: reason,
                            });
                        }
                    }
                    PublishRecord::from_result(item.row, result)
                }
            };

            summary.tally(&record);
            recorder.record(record)?;
        }

        if summary.cancelled {
            reporter.report(BatchEvent::Cancelled {
                processed: summary.total,
            });
        }
        reporter.report(BatchEvent::Finished { summary: &summary });

        Ok(summary)
    }
}
