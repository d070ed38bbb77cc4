//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` or atomics for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::batch::{BatchEvent, BatchReporter};
use crate::error::PasteError;
use crate::models::{ContentItem, PublishedPaste};
use crate::traits::Provider;

// ---------------------------------------------------------------------------
// CallCounter
// ---------------------------------------------------------------------------

/// Shared handle on a mock's call count, kept after the mock is moved into a chain.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

type Fallback = Arc<dyn Fn() -> Result<PublishedPaste, PasteError> + Send + Sync>;

/// Mock provider with a queue of scripted responses.
///
/// Each call pops the first queued response; once the queue is empty every
/// call returns the fallback.
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    responses: Arc<Mutex<Vec<Result<PublishedPaste, PasteError>>>>,
    fallback: Fallback,
    calls: CallCounter,
    texts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    fn build(name: &str, fallback: Fallback) -> Self {
        Self {
            name: name.to_string(),
            responses: Arc::new(Mutex::new(Vec::new())),
            fallback,
            calls: CallCounter::default(),
            texts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Always succeeds with the given URL.
    pub fn succeeding(name: &str, url: &str) -> Self {
        let url = url.to_string();
        Self::build(name, Arc::new(move || Ok(PublishedPaste::new(url.clone()))))
    }

    /// Always fails with a freshly built error.
    pub fn failing<E>(name: &str, error: E) -> Self
    where
        E: Fn() -> PasteError + Send + Sync + 'static,
    {
        Self::build(name, Arc::new(move || Err(error())))
    }

    /// Plays back `responses` in order, then fails with a parse error.
    pub fn with_responses(name: &str, responses: Vec<Result<PublishedPaste, PasteError>>) -> Self {
        let mock = Self::build(
            name,
            Arc::new(|| Err(PasteError::Parse("no scripted response left".into()))),
        );
        *mock.responses.lock().unwrap() = responses;
        mock
    }

    /// Sleeps for `delay` before answering, to simulate a slow endpoint.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }

    /// Texts received so far, in call order.
    pub fn texts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.texts)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, item: &ContentItem) -> Result<PublishedPaste, PasteError> {
        self.calls.bump();
        self.texts.lock().unwrap().push(item.text.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                Some(responses.remove(0))
            }
        };
        scripted.unwrap_or_else(|| (self.fallback)())
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock batch reporter that records event labels.
#[derive(Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, label: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == label)
            .count()
    }
}

impl BatchReporter for MockReporter {
    fn report(&self, event: BatchEvent<'_>) {
        let label = match &event {
            BatchEvent::Started { .. } => "Started",
            BatchEvent::ItemSkipped { .. } => "ItemSkipped",
            BatchEvent::ItemDispatched { .. } => "ItemDispatched",
            BatchEvent::ItemPublished { .. } => "ItemPublished",
            BatchEvent::ItemFailed { .. } => "ItemFailed",
            BatchEvent::Pausing { .. } => "Pausing",
            BatchEvent::Cancelled { .. } => "Cancelled",
            BatchEvent::Finished { .. } => "Finished",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Build items from raw cell values, numbering rows from 1.
pub fn make_items(texts: &[&str]) -> Vec<ContentItem> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| ContentItem::new(i + 1, t))
        .collect()
}
