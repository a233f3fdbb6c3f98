//! Inbox provider trait definition.
//!
//! This module defines the [`InboxProvider`] trait the intake pipeline drives:
//! label lookup and creation, label-scoped thread search, attachment download,
//! read-state and label mutation, and sending the run notification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Address, AttachmentMeta, CandidateAttachment, EmailId, InboxMessage, Label, LabelId, ThreadId,
};

/// Result type alias for inbox provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur during inbox provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Authentication failed or credentials expired.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request or parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A plain-text email to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    /// Recipient addresses.
    pub to: Vec<Address>,
    /// Email subject.
    pub subject: String,
    /// Plain text body.
    pub body_text: String,
}

/// Builds the search query for unread threads carrying `label`.
///
/// Label names with spaces or slashes are quoted, matching Gmail search syntax.
pub fn unread_in_label_query(label: &str) -> String {
    format!("label:\"{}\" is:unread", label.replace('"', ""))
}

/// Trait for inbox backends used by the intake pipeline.
///
/// All methods are async and return [`Result`] to surface provider errors.
///
/// # Example
///
/// ```ignore
/// use contract_intake::providers::email::{InboxProvider, unread_in_label_query};
///
/// async fn count_pending(inbox: &dyn InboxProvider) -> Result<usize> {
///     let threads = inbox
///         .search_threads(&unread_in_label_query("Contracts/To Process"), 10)
///         .await?;
///     Ok(threads.len())
/// }
/// ```
#[async_trait]
pub trait InboxProvider: Send + Sync {
    /// Looks up a user label by display name.
    async fn find_label(&self, name: &str) -> Result<Option<Label>>;

    /// Creates a user label with the given display name.
    async fn create_label(&self, name: &str) -> Result<Label>;

    /// Returns up to `limit` thread IDs matching the search `query`.
    ///
    /// Ordering is whatever the provider returns.
    async fn search_threads(&self, query: &str, limit: u32) -> Result<Vec<ThreadId>>;

    /// Fetches all messages of a thread with attachment metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] if the thread does not exist.
    async fn fetch_thread(&self, thread_id: &ThreadId) -> Result<Vec<InboxMessage>>;

    /// Downloads the content of one attachment.
    async fn fetch_attachment(
        &self,
        message: &InboxMessage,
        attachment: &AttachmentMeta,
    ) -> Result<CandidateAttachment>;

    /// Marks a single message as read.
    async fn mark_read(&self, message_id: &EmailId) -> Result<()>;

    /// Removes `remove` and adds `add` on a thread in one modification.
    async fn swap_thread_label(
        &self,
        thread_id: &ThreadId,
        remove: &LabelId,
        add: &LabelId,
    ) -> Result<()>;

    /// Sends an email and returns the provider message ID.
    async fn send_email(&self, email: &OutgoingEmail) -> Result<String>;
}
