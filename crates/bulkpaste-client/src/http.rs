use std::time::Duration;

use bulkpaste_core::PublishConfig;
use bulkpaste_core::config::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use bulkpaste_core::error::PasteError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Response, StatusCode};

/// Shared HTTP configuration for every provider in a run.
///
/// Holds the header template (user agent plus extra headers) and the
/// per-request timeout. Providers build their clients from it, so one run
/// uses one consistent identity across strategies.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpSettings {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn from_config(config: &PublishConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            headers: config.extra_headers.clone(),
            timeout: config.timeout,
        }
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }

    /// Plain client without a cookie store.
    pub fn client(&self) -> Result<Client, PasteError> {
        self.builder()?
            .build()
            .map_err(|e| PasteError::Transport(e.to_string()))
    }

    /// Client that keeps cookies across requests, for one session attempt.
    pub fn session_client(&self) -> Result<Client, PasteError> {
        self.builder()?
            .cookie_store(true)
            .build()
            .map_err(|e| PasteError::Transport(e.to_string()))
    }

    fn builder(&self) -> Result<ClientBuilder, PasteError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| PasteError::Config(format!("Invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| PasteError::Config(format!("Invalid value for header {name}: {e}")))?;
            headers.insert(name, value);
        }

        Ok(Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .default_headers(headers))
    }
}

/// Classify a failed request the same way for every provider.
pub(crate) fn send_error(e: reqwest::Error, timeout_secs: u64) -> PasteError {
    if e.is_timeout() {
        PasteError::Timeout(timeout_secs)
    } else if e.is_connect() {
        PasteError::Network(format!("Connection failed: {e}"))
    } else {
        PasteError::Transport(e.to_string())
    }
}

pub(crate) fn ensure_success(status: StatusCode, url: &str) -> Result<(), PasteError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(PasteError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Read the full body; a timeout while streaming is still a timeout.
pub(crate) async fn read_body(response: Response, timeout_secs: u64) -> Result<String, PasteError> {
    response.text().await.map_err(|e| {
        if e.is_timeout() {
            PasteError::Timeout(timeout_secs)
        } else {
            PasteError::Transport(format!("Failed to read response body: {e}"))
        }
    })
}
