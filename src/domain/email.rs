//! Email domain types.
//!
//! A scanned inbox message and the addresses attached to it.

use serde::{Deserialize, Serialize};

use super::{AttachmentMeta, EmailId, ThreadId};

/// A message fetched from the monitored label.
///
/// Attachment bytes are not carried here; only their metadata, so the
/// pipeline can filter and size-check before downloading anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxMessage {
    /// Provider message ID.
    pub id: EmailId,
    /// Thread (conversation) this message belongs to.
    pub thread_id: ThreadId,
    /// Sender address.
    pub from: Address,
    /// Subject line, if the message has one.
    pub subject: Option<String>,
    /// Whether the message has already been read.
    pub is_read: bool,
    /// Attachment metadata in MIME order.
    pub attachments: Vec<AttachmentMeta>,
}

impl InboxMessage {
    /// Returns the subject, or an empty string when the header is missing.
    pub fn subject_or_empty(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }
}

/// An email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Email address.
    pub email: String,
    /// Display name (e.g., "John Doe").
    pub name: Option<String>,
}

impl Address {
    /// Creates a new address with just an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Creates a new address with email and display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    /// Parses a header value like `"Jane Agent" <jane@realty.com>`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if let (Some(start), Some(end)) = (value.find('<'), value.rfind('>')) {
            if start < end {
                let email = value[start + 1..end].trim().to_string();
                let name = value[..start].trim().trim_matches('"').trim().to_string();
                return Self {
                    email,
                    name: if name.is_empty() { None } else { Some(name) },
                };
            }
        }
        Self::new(value)
    }

    /// Returns "Name <email>" when a name is present, otherwise the email.
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}
