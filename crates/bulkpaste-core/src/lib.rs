pub mod batch;
pub mod chain;
pub mod config;
pub mod error;
pub mod markdown;
pub mod models;
pub mod retry;
pub mod traits;
pub mod validate;

#[cfg(test)]
pub mod testutil;

pub use batch::{BatchOptions, BatchReporter, BatchRunner, TracingBatchReporter};
pub use chain::ProviderChain;
pub use config::{AlternateService, PublishConfig};
pub use error::PasteError;
pub use models::{
    BatchSummary, ContentItem, PublishRecord, PublishResult, PublishedPaste, RecordStatus,
};
pub use traits::{OutcomeRecorder, Provider};
pub use validate::ContentValidator;
