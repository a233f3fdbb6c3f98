//! Anthropic Messages API document extractor.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::prompt::{PROMPT_VERSION, SYSTEM_PROMPT, TASK_PROMPT};
use super::traits::{DocumentExtractor, ExtractResult, ExtractionError};
use crate::domain::EncodedDocument;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model for contract extraction.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default output token budget.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic API request format.
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Document { source: DocumentSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct DocumentSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: &'a str,
}

/// Anthropic API response format.
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

/// Anthropic API error response.
#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type", default)]
    #[allow(dead_code)]
    error_type: Option<String>,
    message: String,
}

/// Extracts purchase-agreement fields from PDFs through Claude.
pub struct AnthropicExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl AnthropicExtractor {
    /// Creates a new extractor for the given model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Overrides the output token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Points the extractor at a different API host (proxies, gateways).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers
    }

    fn build_request<'a>(&'a self, document: &'a EncodedDocument) -> AnthropicRequest<'a> {
        AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![
                    ContentBlock::Document {
                        source: DocumentSource {
                            source_type: "base64",
                            media_type: &document.media_type,
                            data: &document.data,
                        },
                    },
                    ContentBlock::Text { text: TASK_PROMPT },
                ],
            }],
        }
    }
}

/// Maps a non-success status and its body to an extraction error.
///
/// 429 (rate limit) and 529 (overloaded) are both treated as rate limiting.
pub fn classify_error(status: u16, body: &str) -> ExtractionError {
    if status == 429 || status == 529 {
        return ExtractionError::RateLimited;
    }

    let message = match serde_json::from_str::<AnthropicError>(body) {
        Ok(error) => error.error.message,
        Err(_) => body.to_string(),
    };

    ExtractionError::Upstream { status, message }
}

/// Removes a surrounding fenced code block (```` ``` ```` with an optional
/// language tag) if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parses the model's text output into JSON, tolerating a code fence wrapper.
pub fn parse_extraction_text(text: &str) -> ExtractResult<Value> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| ExtractionError::MalformedResponse(format!("invalid JSON: {}", e)))
}

fn first_text_block(response: AnthropicResponse) -> Option<String> {
    response
        .content
        .into_iter()
        .filter(|c| c.content_type == "text")
        .find_map(|c| c.text)
}

#[async_trait]
impl DocumentExtractor for AnthropicExtractor {
    async fn extract(&self, document: &EncodedDocument) -> ExtractResult<Value> {
        let body = self.build_request(document);

        tracing::debug!(
            model = %self.model,
            prompt_version = PROMPT_VERSION,
            document_bytes = document.data.len(),
            "Sending extraction request"
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .headers(self.build_headers())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body));
        }

        let api_response: AnthropicResponse = response.json().await.map_err(|e| {
            ExtractionError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        if api_response.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(model = %self.model, "Extraction output hit the token budget");
        }

        let text = first_text_block(api_response).ok_or_else(|| {
            ExtractionError::MalformedResponse("response contained no text block".to_string())
        })?;

        parse_extraction_text(&text)
    }
}
