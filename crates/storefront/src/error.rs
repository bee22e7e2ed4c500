// ABOUTME: Error types for storefront extraction including ErrorCode enum and ExtractError struct.
// ABOUTME: Separates the retryable blocked-page signal from schema, URL, and fetch failures.

use std::fmt;

/// Error codes representing different categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The document is a block/challenge page; re-fetch and try again.
    Blocked,
    Schema,
    InvalidUrl,
    Fetch,
    /// Every attempt allowed by the retry policy came back blocked.
    Exhausted,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Blocked => "blocked by challenge page",
            ErrorCode::Schema => "invalid schema",
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Exhausted => "retries exhausted",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for extraction operations.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storefront: {}", self.op)?;
        if !self.url.is_empty() {
            write!(f, " {}", self.url)?;
        }
        write!(f, ": {}", self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Blocked error.
    pub fn blocked(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::Blocked, url, op, None)
    }

    /// Create a Schema error.
    pub fn schema(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Schema, String::new(), op, source)
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, url, op, source)
    }

    /// Create an Exhausted error wrapping the last blocked attempt.
    pub fn exhausted(url: impl Into<String>, op: impl Into<String>, last: ExtractError) -> Self {
        Self::new(ErrorCode::Exhausted, url, op, Some(anyhow::Error::new(last)))
    }

    /// Returns true if this is a Blocked error.
    pub fn is_blocked(&self) -> bool {
        self.code == ErrorCode::Blocked
    }

    /// Returns true if this is a Schema error.
    pub fn is_schema(&self) -> bool {
        self.code == ErrorCode::Schema
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is an Exhausted error.
    pub fn is_exhausted(&self) -> bool {
        self.code == ErrorCode::Exhausted
    }

    /// Returns true if re-fetching the page may succeed.
    ///
    /// Only blocked pages are retryable from the extractor's side; transport
    /// failures follow the fetch service's own policy.
    pub fn is_retryable(&self) -> bool {
        self.is_blocked()
    }
}
