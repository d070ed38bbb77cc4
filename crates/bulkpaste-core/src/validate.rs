//! Local content checks run before any network call.

/// Tokens that spreadsheet exports use for a missing cell.
const PLACEHOLDERS: &[&str] = &["nan", "null", "none", "undefined", "n/a"];

/// Default minimum length, in characters, of publishable text.
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// Why a piece of content was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    Placeholder(String),
    TooShort { len: usize, min: usize },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Empty => write!(f, "content is empty"),
            Rejection::Placeholder(token) => {
                write!(f, "content is a missing-value placeholder ('{token}')")
            }
            Rejection::TooShort { len, min } => {
                write!(f, "content too short ({len} < {min} characters)")
            }
        }
    }
}

/// Rejects empty, placeholder and too-short text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentValidator {
    min_len: usize,
}

impl ContentValidator {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn validate(&self, text: &str) -> bool {
        self.check(text).is_ok()
    }

    /// Same rules as [`validate`](Self::validate), returning the reason on rejection.
    pub fn check(&self, text: &str) -> Result<(), Rejection> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejection::Empty);
        }

        let lowered = text.to_lowercase();
        if PLACEHOLDERS.contains(&lowered.as_str()) {
            return Err(Rejection::Placeholder(lowered));
        }

        let len = text.chars().count();
        if len < self.min_len {
            return Err(Rejection::TooShort {
                len,
                min: self.min_len,
            });
        }

        Ok(())
    }
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH)
    }
}
