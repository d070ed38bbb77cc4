use async_trait::async_trait;
use bulkpaste_core::config::AlternateService;
use bulkpaste_core::error::PasteError;
use bulkpaste_core::{ContentItem, Provider, PublishedPaste};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::http::{HttpSettings, ensure_success, read_body, send_error};

/// How the text is put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Form-encoded field.
    Form { field: String },
    /// Multipart file upload.
    Multipart { field: String, file_name: String },
    /// Raw request body.
    Raw,
}

/// The response body, trimmed, must be an absolute http(s) URL.
pub(crate) fn parse_bare_url(body: &str) -> Result<String, PasteError> {
    let candidate = body.trim();
    let url = Url::parse(candidate).map_err(|_| {
        let preview: String = candidate.chars().take(80).collect();
        PasteError::Parse(format!("Expected a bare URL in response, got '{preview}'"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(candidate.to_string()),
        scheme => Err(PasteError::Parse(format!(
            "Response URL has unexpected scheme '{scheme}'"
        ))),
    }
}

/// An unrelated paste/file host used as a last resort.
#[derive(Clone)]
pub struct AlternateProvider {
    name: String,
    endpoint: String,
    submission: Submission,
    client: Client,
    timeout_secs: u64,
}

impl AlternateProvider {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        submission: Submission,
        settings: &HttpSettings,
    ) -> Result<Self, PasteError> {
        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            submission,
            client: settings.client()?,
            timeout_secs: settings.timeout_secs(),
        })
    }

    /// Known public services with their submission formats.
    pub fn for_service(
        service: AlternateService,
        settings: &HttpSettings,
    ) -> Result<Self, PasteError> {
        let (endpoint, submission) = match service {
            AlternateService::Dpaste => (
                "https://dpaste.com/api/v2/",
                Submission::Form {
                    field: "content".into(),
                },
            ),
            AlternateService::PasteRs => ("https://paste.rs/", Submission::Raw),
            AlternateService::ZeroXZero => (
                "https://0x0.st",
                Submission::Multipart {
                    field: "file".into(),
                    file_name: "paste.txt".into(),
                },
            ),
        };
        Self::new(service.as_str(), endpoint, submission, settings)
    }

    /// Point the provider at another endpoint (mirrors, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Provider for AlternateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, item: &ContentItem) -> Result<PublishedPaste, PasteError> {
        let request = self.client.post(&self.endpoint);
        let request = match &self.submission {
            Submission::Form { field } => request.form(&[(field.as_str(), item.text.as_str())]),
            Submission::Multipart { field, file_name } => {
                let part = Part::text(item.text.clone()).file_name(file_name.clone());
                request.multipart(Form::new().part(field.clone(), part))
            }
            Submission::Raw => request
                .header("Content-Type", "text/plain; charset=utf-8")
                .body(item.text.clone()),
        };

        let response = request
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;
        ensure_success(response.status(), &self.endpoint)?;
        let body = read_body(response, self.timeout_secs).await?;
        parse_bare_url(&body).map(PublishedPaste::new)
    }
}
