use serde::Serialize;

/// One row of text to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// 1-based data row index, used for reporting.
    pub row: usize,
    /// Text with surrounding whitespace removed.
    pub text: String,
}

impl ContentItem {
    pub fn new(row: usize, text: impl AsRef<str>) -> Self {
        Self {
            row,
            text: text.as_ref().trim().to_string(),
        }
    }

    /// Returns a copy of this item with its text replaced (and re-trimmed).
    pub fn with_text(&self, text: impl AsRef<str>) -> Self {
        Self::new(self.row, text)
    }
}

/// What a single provider hands back when a paste was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPaste {
    pub url: String,
    /// Opaque token for later edits, when the provider issues one.
    pub edit_code: Option<String>,
}

impl PublishedPaste {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            edit_code: None,
        }
    }

    pub fn with_edit_code(mut self, edit_code: Option<String>) -> Self {
        self.edit_code = edit_code.filter(|c| !c.is_empty());
        self
    }
}

/// Outcome of running one item through the provider chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishResult {
    Success {
        url: String,
        edit_code: Option<String>,
        /// Name of the provider that succeeded.
        method: String,
    },
    Failure {
        reason: String,
    },
}

impl PublishResult {
    pub fn success(paste: PublishedPaste, method: impl Into<String>) -> Self {
        PublishResult::Success {
            url: paste.url,
            edit_code: paste.edit_code,
            method: method.into(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        PublishResult::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PublishResult::Success { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            PublishResult::Success { url, .. } => Some(url),
            PublishResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PublishResult::Success { .. } => None,
            PublishResult::Failure { reason } => Some(reason),
        }
    }
}

/// Row status in the results sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Failed,
    Skipped,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Success => "success",
            RecordStatus::Failed => "failed",
            RecordStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output row: `row, status, url, edit_code, method, error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishRecord {
    pub row: usize,
    pub status: RecordStatus,
    pub url: Option<String>,
    pub edit_code: Option<String>,
    pub method: Option<String>,
    pub error: Option<String>,
}

impl PublishRecord {
    pub fn from_result(row: usize, result: PublishResult) -> Self {
        match result {
            PublishResult::Success {
                url,
                edit_code,
                method,
            } => Self {
                row,
                status: RecordStatus::Success,
                url: Some(url),
                edit_code,
                method: Some(method),
                error: None,
            },
            PublishResult::Failure { reason } => Self {
                row,
                status: RecordStatus::Failed,
                url: None,
                edit_code: None,
                method: None,
                error: Some(reason),
            },
        }
    }

    /// Row rejected by the validator; no network call was made.
    pub fn skipped(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            status: RecordStatus::Skipped,
            url: None,
            edit_code: None,
            method: None,
            error: Some(reason.into()),
        }
    }
}

/// Aggregate counts for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// The run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl BatchSummary {
    pub fn tally(&mut self, record: &PublishRecord) {
        self.total += 1;
        match record.status {
            RecordStatus::Success => self.succeeded += 1,
            RecordStatus::Failed => self.failed += 1,
            RecordStatus::Skipped => self.skipped += 1,
        }
    }
}
