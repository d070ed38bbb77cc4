use async_trait::async_trait;

use crate::error::PasteError;
use crate::models::{ContentItem, PublishRecord, PublishedPaste};

/// A single publishing strategy in the provider chain.
///
/// Object-safe so that the chain can hold an ordered, heterogeneous list of
/// strategies (`Vec<Box<dyn Provider>>`).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Name recorded as the `method` of a successful publish.
    fn name(&self) -> &str;

    /// Submits the item's text and returns the created paste.
    async fn publish(&self, item: &ContentItem) -> Result<PublishedPaste, PasteError>;
}

/// Consumes per-row outcomes (e.g. a results spreadsheet).
pub trait OutcomeRecorder {
    fn record(&mut self, record: PublishRecord) -> Result<(), PasteError>;
}

impl OutcomeRecorder for Vec<PublishRecord> {
    fn record(&mut self, record: PublishRecord) -> Result<(), PasteError> {
        self.push(record);
        Ok(())
    }
}

