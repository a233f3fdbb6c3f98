//! Attachment types for the intake pipeline.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::EmailId;

/// MIME type of the only document format the pipeline analyzes.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Hard ceiling on attachment size before encoding (20 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Attachment metadata as listed on a message, before any bytes are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    /// Provider attachment ID used to download the content.
    pub id: String,
    /// Original filename.
    pub filename: String,
    /// Declared MIME content type.
    pub content_type: String,
    /// Declared size in bytes.
    pub size_bytes: u64,
}

impl AttachmentMeta {
    /// Whether the declared media type or the filename extension marks this
    /// attachment as a PDF document.
    pub fn is_document(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .map(|mime| mime.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
            .unwrap_or(false)
            || self.filename.to_ascii_lowercase().ends_with(".pdf")
    }
}

/// A downloaded attachment that is a candidate for extraction.
#[derive(Debug, Clone)]
pub struct CandidateAttachment {
    /// Message the attachment was fetched from.
    pub message_id: EmailId,
    /// Original filename.
    pub filename: String,
    /// Declared MIME content type.
    pub content_type: String,
    /// Raw attachment bytes.
    pub data: Vec<u8>,
}

impl CandidateAttachment {
    /// Actual size of the downloaded content.
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Encodes the attachment into the base64 transport form the extraction
    /// endpoint accepts.
    pub fn encode(&self) -> EncodedDocument {
        EncodedDocument {
            media_type: PDF_MEDIA_TYPE.to_string(),
            data: STANDARD.encode(&self.data),
        }
    }
}

/// A document ready to be sent to the extraction endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    /// Media type announced to the endpoint.
    pub media_type: String,
    /// Standard base64 of the document bytes.
    pub data: String,
}
