use std::time::Duration;

use url::Url;

use crate::batch::BatchOptions;
use crate::error::PasteError;
use crate::retry::RetryPolicy;
use crate::validate::{ContentValidator, DEFAULT_MIN_LENGTH};

pub const DEFAULT_BASE_URL: &str = "https://rentry.co";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fallback services tried after the primary provider, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternateService {
    Dpaste,
    PasteRs,
    ZeroXZero,
}

impl AlternateService {
    pub const ALL: [AlternateService; 3] = [
        AlternateService::Dpaste,
        AlternateService::PasteRs,
        AlternateService::ZeroXZero,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlternateService::Dpaste => "dpaste",
            AlternateService::PasteRs => "paste.rs",
            AlternateService::ZeroXZero => "0x0.st",
        }
    }
}

impl std::fmt::Display for AlternateService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlternateService {
    type Err = PasteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dpaste" | "dpaste.com" => Ok(AlternateService::Dpaste),
            "paste.rs" | "pasters" => Ok(AlternateService::PasteRs),
            "0x0" | "0x0.st" => Ok(AlternateService::ZeroXZero),
            other => Err(PasteError::Config(format!(
                "Unknown alternate service '{other}' (expected dpaste, paste.rs or 0x0.st)"
            ))),
        }
    }
}

/// Parse a comma-separated service list. `none` or an empty string disables alternates.
pub fn parse_alternates(raw: &str) -> Result<Vec<AlternateService>, PasteError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Everything one batch run needs, built once and passed down explicitly.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Root of the primary paste site (api at `<base>/api/new`).
    pub base_url: String,
    pub user_agent: String,
    /// Extra headers sent with every request.
    pub extra_headers: Vec<(String, String)>,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Retry policy for the primary API step.
    pub api_retry: RetryPolicy,
    pub alternates: Vec<AlternateService>,
    /// Whether to try launching a headless browser.
    pub browser: bool,
    pub min_length: usize,
    pub normalize_markdown: bool,
    /// Pause between consecutive submissions.
    pub delay: Duration,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extra_headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            api_retry: RetryPolicy::default(),
            alternates: AlternateService::ALL.to_vec(),
            browser: true,
            min_length: DEFAULT_MIN_LENGTH,
            normalize_markdown: false,
            delay: Duration::from_secs(2),
        }
    }
}

impl PublishConfig {
    /// Check the values a user can get wrong.
    pub fn validate(&self) -> Result<(), PasteError> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| PasteError::Config(format!("Invalid base URL '{}': {e}", self.base_url)))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(PasteError::Config(format!(
                    "Base URL scheme '{scheme}' is not allowed (only http/https)"
                )));
            }
        }
        if parsed.host_str().is_none() {
            return Err(PasteError::Config("Base URL has no host".into()));
        }
        if self.timeout.is_zero() {
            return Err(PasteError::Config("Timeout must be greater than zero".into()));
        }
        if self.api_retry.attempts == 0 {
            return Err(PasteError::Config("API attempts must be at least 1".into()));
        }
        if self.min_length == 0 {
            return Err(PasteError::Config("Minimum length must be at least 1".into()));
        }
        Ok(())
    }

    /// Host of the primary site, used to recognise its paste URLs.
    pub fn domain(&self) -> Result<String, PasteError> {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| PasteError::Config(format!("Invalid base URL '{}'", self.base_url)))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn validator(&self) -> ContentValidator {
        ContentValidator::new(self.min_length)
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::default()
            .with_delay(self.delay)
            .with_markdown_normalization(self.normalize_markdown)
            .with_validator(self.validator())
    }
}
