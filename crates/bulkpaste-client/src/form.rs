use async_trait::async_trait;
use bulkpaste_core::error::PasteError;
use bulkpaste_core::{ContentItem, Provider, PublishedPaste};
use regex::Regex;
use reqwest::Client;
use url::Url;

use crate::http::{HttpSettings, ensure_success, read_body, send_error};

/// Site pages that are never a freshly created paste.
const RESERVED_PATHS: &[&str] = &[
    "api", "new", "what", "static", "raw", "edit", "login", "logout", "contact", "about",
];

/// Recognises paste URLs on one provider's domain.
#[derive(Debug, Clone)]
pub struct PasteUrlMatcher {
    domain: String,
    pattern: Regex,
}

impl PasteUrlMatcher {
    pub fn new(domain: &str) -> Result<Self, PasteError> {
        // The id must end the URL, so `favicon.ico` or `abc/edit` never match.
        let pattern = Regex::new(&format!(
            r#"(https?://(?:www\.)?{}(?::\d+)?/([A-Za-z0-9]+))(?:["'\s<>?#)]|$)"#,
            regex::escape(domain)
        ))
        .map_err(|e| PasteError::Config(format!("Invalid domain '{domain}': {e}")))?;

        Ok(Self {
            domain: domain.to_string(),
            pattern,
        })
    }

    fn is_reserved(id: &str) -> bool {
        RESERVED_PATHS.contains(&id.to_ascii_lowercase().as_str())
    }

    /// Accept a URL reached after redirects if it points at a paste on this domain.
    pub fn from_url(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?;
        if host != self.domain && host.strip_prefix("www.") != Some(self.domain.as_str()) {
            return None;
        }
        let id = url.path().trim_matches('/');
        let is_id = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric());
        if is_id && !Self::is_reserved(id) {
            Some(url.to_string())
        } else {
            None
        }
    }

    /// First embedded `https://<domain>/<id>` in a response body.
    pub fn from_body(&self, body: &str) -> Option<String> {
        self.pattern
            .captures_iter(body)
            .find(|caps| !Self::is_reserved(&caps[2]))
            .map(|caps| caps[1].to_string())
    }
}

/// Header variations applied to successive form attempts.
fn header_variants(base_url: &str) -> Vec<Vec<(&'static str, String)>> {
    vec![
        vec![
            ("Referer", format!("{base_url}/")),
            ("Origin", base_url.to_string()),
        ],
        vec![
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            ),
            ("Accept-Language", "en-US,en;q=0.9".to_string()),
            ("Referer", format!("{base_url}/new")),
        ],
        Vec::new(),
    ]
}

/// One POST of the text as form data, followed by redirect/body inspection.
///
/// Shared by the form and session strategies.
pub(crate) async fn submit_form(
    client: &Client,
    url: &str,
    fields: &[(&str, &str)],
    headers: &[(&'static str, String)],
    matcher: &PasteUrlMatcher,
    timeout_secs: u64,
) -> Result<PublishedPaste, PasteError> {
    let mut request = client.post(url).form(fields);
    for (name, value) in headers {
        request = request.header(*name, value);
    }

    let response = request.send().await.map_err(|e| send_error(e, timeout_secs))?;
    ensure_success(response.status(), url)?;

    if let Some(found) = matcher.from_url(response.url()) {
        return Ok(PublishedPaste::new(found));
    }

    let body = read_body(response, timeout_secs).await?;
    matcher
        .from_body(&body)
        .map(PublishedPaste::new)
        .ok_or_else(|| PasteError::Parse(format!("No paste URL found in response from {url}")))
}

/// Raw form submission to the site root and alternate paths.
#[derive(Clone)]
pub struct FormProvider {
    client: Client,
    base_url: String,
    paths: Vec<String>,
    matcher: PasteUrlMatcher,
    timeout_secs: u64,
}

impl FormProvider {
    /// Posts to `/` then `/new`, then `/` again with a bare header set.
    pub fn new(settings: &HttpSettings, base_url: &str, domain: &str) -> Result<Self, PasteError> {
        Ok(Self {
            client: settings.client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            paths: vec!["/".into(), "/new".into(), "/".into()],
            matcher: PasteUrlMatcher::new(domain)?,
            timeout_secs: settings.timeout_secs(),
        })
    }

    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }
}

#[async_trait]
impl Provider for FormProvider {
    fn name(&self) -> &str {
        "form"
    }

    async fn publish(&self, item: &ContentItem) -> Result<PublishedPaste, PasteError> {
        let variants = header_variants(&self.base_url);
        let mut last_error = PasteError::Config("no form paths configured".into());

        for (i, path) in self.paths.iter().enumerate() {
            let url = format!("{}{}", self.base_url, path);
            let headers = &variants[i % variants.len()];
            match submit_form(
                &self.client,
                &url,
                &[("text", item.text.as_str())],
                headers,
                &self.matcher,
                self.timeout_secs,
            )
            .await
            {
                Ok(paste) => return Ok(paste),
                Err(e) => {
                    tracing::debug!(row = item.row, %url, error = %e, "Form attempt failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
