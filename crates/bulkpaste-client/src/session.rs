use std::sync::LazyLock;

use async_trait::async_trait;
use bulkpaste_core::error::PasteError;
use bulkpaste_core::{ContentItem, Provider, PublishedPaste};
use regex::Regex;
use reqwest::Client;

use crate::api::{API_PATH, parse_api_response};
use crate::form::{PasteUrlMatcher, submit_form};
use crate::http::{HttpSettings, ensure_success, read_body, send_error};

static CSRF_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name=["']csrfmiddlewaretoken["'][^>]*?value=["']([^"']+)["']"#)
        .expect("csrf pattern must compile")
});

/// Pull an anti-forgery token out of the landing page, if it embeds one.
fn extract_csrf_token(html: &str) -> Option<String> {
    CSRF_INPUT.captures(html).map(|caps| caps[1].to_string())
}

/// Cookie-bearing retry of the API and form submissions.
///
/// Some sites answer cookie-less POSTs with 403. Each attempt builds a fresh
/// cookie store, loads the landing page once to collect cookies (and the form
/// token, when present), then replays the API call and, failing that, a form
/// POST to the root within the same session.
#[derive(Clone)]
pub struct SessionProvider {
    settings: HttpSettings,
    base_url: String,
    matcher: PasteUrlMatcher,
}

impl SessionProvider {
    pub fn new(settings: HttpSettings, base_url: &str, domain: &str) -> Result<Self, PasteError> {
        Ok(Self {
            settings,
            base_url: base_url.trim_end_matches('/').to_string(),
            matcher: PasteUrlMatcher::new(domain)?,
        })
    }

    async fn open_session(&self, client: &Client) -> Result<Option<String>, PasteError> {
        let landing = format!("{}/", self.base_url);
        let timeout_secs = self.settings.timeout_secs();
        let response = client
            .get(&landing)
            .send()
            .await
            .map_err(|e| send_error(e, timeout_secs))?;
        ensure_success(response.status(), &landing)?;
        let html = read_body(response, timeout_secs).await?;
        Ok(extract_csrf_token(&html))
    }

    async fn post_api(
        &self,
        client: &Client,
        fields: &[(&str, &str)],
    ) -> Result<PublishedPaste, PasteError> {
        let endpoint = format!("{}{}", self.base_url, API_PATH);
        let timeout_secs = self.settings.timeout_secs();
        let response = client
            .post(&endpoint)
            .header("Referer", format!("{}/", self.base_url))
            .form(fields)
            .send()
            .await
            .map_err(|e| send_error(e, timeout_secs))?;
        ensure_success(response.status(), &endpoint)?;
        let body = read_body(response, timeout_secs).await?;
        parse_api_response(&self.base_url, &body)
    }
}

#[async_trait]
impl Provider for SessionProvider {
    fn name(&self) -> &str {
        "session"
    }

    async fn publish(&self, item: &ContentItem) -> Result<PublishedPaste, PasteError> {
        let client = self.settings.session_client()?;
        let csrf = self.open_session(&client).await?;

        let mut fields: Vec<(&str, &str)> = vec![("text", item.text.as_str())];
        if let Some(token) = csrf.as_deref() {
            fields.push(("csrfmiddlewaretoken", token));
        }

        match self.post_api(&client, &fields).await {
            Ok(paste) => return Ok(paste),
            Err(e) => {
                tracing::debug!(row = item.row, error = %e, "Session API call failed, trying form");
            }
        }

        let root = format!("{}/", self.base_url);
        let headers = [("Referer", root.clone())];
        submit_form(
            &client,
            &root,
            &fields,
            &headers,
            &self.matcher,
            self.settings.timeout_secs(),
        )
        .await
    }
}
