use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bulkpaste_core::error::PasteError;
use bulkpaste_core::{ContentItem, Provider, PublishedPaste};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use url::Url;

use crate::form::PasteUrlMatcher;

const TEXTAREA_SELECTOR: &str = "textarea";
const SUBMIT_SELECTOR: &str =
    "#submitButton, form button[type=submit], form input[type=submit]";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Drives the site's own creation page in headless Chromium.
///
/// Last resort for the primary site: fills the text area, clicks submit and
/// waits for the tab to land on a paste URL. A single Chromium process is
/// shared across clones; each item gets its own tab.
///
/// # Example
///
/// ```rust,no_run
/// use bulkpaste_client::BrowserProvider;
/// use bulkpaste_core::{ContentItem, Provider};
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let provider =
///     BrowserProvider::launch("https://rentry.co", "rentry.co", Duration::from_secs(30)).await?;
/// let paste = provider.publish(&ContentItem::new(1, "hello from chromium")).await?;
/// println!("{}", paste.url);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BrowserProvider {
    browser: Arc<Browser>,
    base_url: String,
    matcher: PasteUrlMatcher,
    timeout: Duration,
}

impl BrowserProvider {
    /// Launch Chromium once. Any failure means the capability is unavailable.
    pub async fn launch(base_url: &str, domain: &str, timeout: Duration) -> Result<Self, PasteError> {
        let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();

        // Snap's /snap/bin/chromium wrapper drops --headless; prefer the real binary.
        if let Some(bin) = find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .build()
            .map_err(|e| PasteError::CapabilityUnavailable(format!("browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| PasteError::CapabilityUnavailable(format!("browser launch: {e}")))?;

        // The CDP handler must be polled for the connection to make progress.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(browser),
            base_url: base_url.trim_end_matches('/').to_string(),
            matcher: PasteUrlMatcher::new(domain)?,
            timeout,
        })
    }

    async fn fill_and_submit(&self, page: &Page, text: &str) -> Result<PublishedPaste, PasteError> {
        page.find_element(TEXTAREA_SELECTOR)
            .await
            .map_err(|e| PasteError::Parse(format!("No text area on creation page: {e}")))?;

        let literal = serde_json::to_string(text)?;
        let script = format!(
            "(() => {{ const t = document.querySelector('{TEXTAREA_SELECTOR}'); \
             t.value = {literal}; \
             t.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             return true; }})()"
        );
        page.evaluate(script)
            .await
            .map_err(|e| PasteError::Transport(format!("Failed to fill text area: {e}")))?;

        page.find_element(SUBMIT_SELECTOR)
            .await
            .map_err(|e| PasteError::Parse(format!("No submit control on creation page: {e}")))?
            .click()
            .await
            .map_err(|e| PasteError::Transport(format!("Failed to click submit: {e}")))?;

        loop {
            let current = page
                .url()
                .await
                .map_err(|e| PasteError::Transport(format!("Failed to read page URL: {e}")))?;
            if let Some(found) = current
                .as_deref()
                .and_then(|u| Url::parse(u).ok())
                .and_then(|u| self.matcher.from_url(&u))
            {
                return Ok(PublishedPaste::new(found));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Locate a usable Chrome/Chromium binary, `CHROME_BIN` first.
///
/// Returns `None` to let chromiumoxide run its own lookup.
fn find_chrome_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    [
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
        "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}

#[async_trait]
impl Provider for BrowserProvider {
    fn name(&self) -> &str {
        "browser"
    }

    async fn publish(&self, item: &ContentItem) -> Result<PublishedPaste, PasteError> {
        let landing = format!("{}/", self.base_url);
        let page = self
            .browser
            .new_page(landing.as_str())
            .await
            .map_err(|e| PasteError::Transport(format!("Failed to open {landing}: {e}")))?;

        let outcome = tokio::time::timeout(self.timeout, self.fill_and_submit(&page, &item.text))
            .await
            .unwrap_or_else(|_| Err(PasteError::Timeout(self.timeout.as_secs())));

        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "Failed to close browser tab");
        }
        outcome
    }
}
