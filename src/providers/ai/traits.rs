//! Document extraction trait and its error taxonomy.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::EncodedDocument;

/// Errors that can occur while extracting a document.
///
/// [`ExtractionError::RateLimited`] is the only variant the retry coordinator
/// acts on; everything else is surfaced to the run summary as-is.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("rate limited by extraction endpoint")]
    RateLimited,

    #[error("API error: {status} - {message}")]
    Upstream { status: u16, message: String },

    #[error("malformed extraction response: {0}")]
    MalformedResponse(String),

    #[error("attachment too large: {size} bytes exceeds the {limit} byte limit")]
    AttachmentTooLarge { size: u64, limit: u64 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ExtractionError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractionError>;

/// A service that turns a document into structured JSON.
///
/// Implementations make exactly one outbound call per invocation and never
/// retry; see [`crate::services::extract_with_retry`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extracts the structured analysis of `document`.
    async fn extract(&self, document: &EncodedDocument) -> ExtractResult<Value>;
}
