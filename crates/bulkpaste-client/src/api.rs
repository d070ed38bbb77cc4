use async_trait::async_trait;
use bulkpaste_core::error::PasteError;
use bulkpaste_core::{ContentItem, Provider, PublishedPaste};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::http::{HttpSettings, ensure_success, read_body, send_error};

pub const API_PATH: &str = "/api/new";

/// JSON body returned by the paste creation endpoint.
///
/// Some deployments echo an application-level `status` next to the HTTP one
/// (e.g. `"status": "403"`), with the reason in `content`.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    url: Option<String>,
    edit_code: Option<String>,
    status: Option<serde_json::Value>,
    content: Option<serde_json::Value>,
}

fn status_code(value: &serde_json::Value) -> Option<u16> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Make a possibly-relative paste URL absolute against the site root.
pub(crate) fn absolutize(base_url: &str, url: &str) -> String {
    match Url::parse(url) {
        Ok(_) => url.to_string(),
        Err(_) => Url::parse(base_url)
            .and_then(|base| base.join(url))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string()),
    }
}

/// Parse a creation response: a JSON object with a non-empty `url`.
pub(crate) fn parse_api_response(base_url: &str, body: &str) -> Result<PublishedPaste, PasteError> {
    let parsed: ApiResponse = serde_json::from_str(body)
        .map_err(|e| PasteError::Parse(format!("Response is not valid JSON: {e}")))?;

    if let Some(code) = parsed.status.as_ref().and_then(status_code) {
        if !(200..300).contains(&code) {
            let detail = parsed
                .content
                .map(|c| match c {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or_default();
            return Err(PasteError::Parse(format!(
                "API reported status {code}: {detail}"
            )));
        }
    }

    match parsed.url.filter(|u| !u.trim().is_empty()) {
        Some(url) => Ok(PublishedPaste::new(absolutize(base_url, url.trim()))
            .with_edit_code(parsed.edit_code)),
        None => Err(PasteError::Parse("JSON response has no 'url' field".into())),
    }
}

/// Direct POST to the provider's JSON creation endpoint.
///
/// Succeeds only on a 2xx status with a JSON body carrying a `url`.
#[derive(Clone)]
pub struct ApiProvider {
    client: Client,
    base_url: String,
    endpoint: String,
    field: String,
    timeout_secs: u64,
}

impl ApiProvider {
    /// Endpoint `<base_url>/api/new`, text sent as the `text` form field.
    pub fn new(settings: &HttpSettings, base_url: &str) -> Result<Self, PasteError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client: settings.client()?,
            endpoint: format!("{base_url}{API_PATH}"),
            base_url,
            field: "text".to_string(),
            timeout_secs: settings.timeout_secs(),
        })
    }

    /// Use another form field for the text (`content` for snippet-style APIs).
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

#[async_trait]
impl Provider for ApiProvider {
    fn name(&self) -> &str {
        "api"
    }

    async fn publish(&self, item: &ContentItem) -> Result<PublishedPaste, PasteError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[(self.field.as_str(), item.text.as_str())])
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;

        ensure_success(response.status(), &self.endpoint)?;
        let body = read_body(response, self.timeout_secs).await?;
        parse_api_response(&self.base_url, &body)
    }
}
