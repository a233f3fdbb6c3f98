//! Language-model document extraction.
//!
//! The [`DocumentExtractor`] trait is the seam the pipeline depends on; the
//! [`AnthropicExtractor`] implements it against the Anthropic Messages API
//! using PDF document input.
//!
//! # Example
//!
//! ```rust,no_run
//! use contract_intake::domain::EncodedDocument;
//! use contract_intake::providers::ai::{AnthropicExtractor, DocumentExtractor, DEFAULT_MODEL};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = AnthropicExtractor::new("sk-ant-...", DEFAULT_MODEL);
//! let document = EncodedDocument {
//!     media_type: "application/pdf".to_string(),
//!     data: "JVBERi0xLjQK...".to_string(),
//! };
//!
//! let analysis = extractor.extract(&document).await?;
//! println!("{}", analysis["property"]["street"]);
//! # Ok(())
//! # }
//! ```

mod anthropic;
mod prompt;
mod traits;

pub use anthropic::{
    classify_error, parse_extraction_text, strip_code_fence, AnthropicExtractor,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
pub use prompt::{PROMPT_VERSION, SYSTEM_PROMPT, TASK_PROMPT};
#[cfg(test)]
pub use traits::MockDocumentExtractor;
pub use traits::{DocumentExtractor, ExtractResult, ExtractionError};
