use thiserror::Error;

use crate::validate::Rejection;

/// Error types for bulkpaste.
#[derive(Error, Debug)]
pub enum PasteError {
    /// Content was rejected locally before any network call.
    #[error("{0}")]
    Validation(Rejection),

    /// Provider answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    Network(String),

    /// Any other request failure (building, redirects, reading the body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// 2xx response whose body did not carry a usable paste URL.
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An optional capability (e.g. the headless browser) is not present.
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rows could not be read.
    #[error("Input error: {0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Rejection> for PasteError {
    fn from(rejection: Rejection) -> Self {
        PasteError::Validation(rejection)
    }
}

impl PasteError {
    /// Short, stable label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PasteError::Validation(_) => "validation",
            PasteError::Http { .. }
            | PasteError::Timeout(_)
            | PasteError::Network(_)
            | PasteError::Transport(_) => "transport",
            PasteError::Parse(_) | PasteError::Serialization(_) => "parse",
            PasteError::CapabilityUnavailable(_) => "capability",
            PasteError::Config(_) => "config",
            PasteError::Input(_) | PasteError::Io(_) => "input",
        }
    }

    /// Returns true if the provider chain should move on to the next strategy.
    ///
    /// Setup errors (config, input) are never produced by a provider attempt
    /// and are not fallthrough errors.
    pub fn is_fallthrough(&self) -> bool {
        matches!(self.kind(), "transport" | "parse" | "capability")
    }

    /// Returns true for the optional-capability case that is logged as a skip.
    pub fn is_skip(&self) -> bool {
        matches!(self, PasteError::CapabilityUnavailable(_))
    }
}
