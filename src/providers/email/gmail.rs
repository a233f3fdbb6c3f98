//! Gmail API inbox provider.
//!
//! This module provides an [`InboxProvider`] implementation using the Gmail
//! REST API with OAuth 2.0 refresh-token authentication.
//!
//! # API Usage
//!
//! - `users.labels.list` / `users.labels.create` for label resolution
//! - `users.threads.list` with a `q` search for label-scoped unread threads
//! - `users.threads.get` for messages and attachment metadata
//! - `users.messages.attachments.get` for attachment bytes
//! - `users.messages.modify` / `users.threads.modify` for read state and labels
//! - `users.messages.send` for the run notification

use async_trait::async_trait;
use base64::prelude::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::{InboxProvider, OutgoingEmail, ProviderError, Result};
use crate::domain::{
    system_labels, Address, AttachmentMeta, CandidateAttachment, EmailId, InboxMessage, Label,
    LabelId, ThreadId,
};

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Gmail API thread list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadListResponse {
    threads: Option<Vec<GmailThreadRef>>,
}

#[derive(Debug, Deserialize)]
struct GmailThreadRef {
    id: String,
}

/// Gmail API thread.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailThread {
    id: String,
    messages: Option<Vec<GmailMessage>>,
}

/// Gmail API message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessage {
    id: String,
    thread_id: String,
    label_ids: Option<Vec<String>>,
    payload: Option<GmailPart>,
}

/// Gmail message part. The top-level payload is itself a part.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPart {
    mime_type: Option<String>,
    filename: Option<String>,
    headers: Option<Vec<GmailHeader>>,
    body: Option<GmailBody>,
    parts: Option<Vec<GmailPart>>,
}

#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailBody {
    size: Option<u64>,
    attachment_id: Option<String>,
}

/// Gmail attachment download response.
#[derive(Debug, Deserialize)]
struct AttachmentResponse {
    data: String,
}

/// Gmail API label.
#[derive(Debug, Deserialize)]
struct GmailLabel {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct LabelsListResponse {
    labels: Option<Vec<GmailLabel>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLabelRequest<'a> {
    name: &'a str,
    label_list_visibility: &'static str,
    message_list_visibility: &'static str,
}

/// Gmail modify request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    add_label_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    remove_label_ids: Vec<String>,
}

/// OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth credentials stored in the keychain as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailCredentials {
    /// OAuth refresh token.
    pub refresh_token: String,
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

/// Gmail API provider.
///
/// # Example
///
/// ```ignore
/// let mut gmail = GmailProvider::with_credentials(credentials);
/// gmail.authenticate().await?;
///
/// let threads = gmail.search_threads("label:Contracts is:unread", 10).await?;
/// ```
pub struct GmailProvider {
    client: reqwest::Client,
    credentials: GmailCredentials,
    /// Current OAuth access token, set by [`authenticate`](Self::authenticate).
    access_token: Option<String>,
}

impl GmailProvider {
    /// Creates a provider from OAuth credentials.
    ///
    /// The provider is not usable until [`authenticate`](Self::authenticate) is called.
    pub fn with_credentials(credentials: GmailCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            access_token: None,
        }
    }

    /// Returns whether an access token has been obtained.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Exchanges the refresh token for an access token.
    ///
    /// One token lasts an hour, which comfortably covers a single run.
    pub async fn authenticate(&mut self) -> Result<()> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Authentication(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Internal(format!("parse token response: {}", e)))?;

        self.access_token = Some(token_response.access_token);
        tracing::info!("Gmail provider authenticated");
        Ok(())
    }

    /// Builds authorization headers for API requests.
    fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self
            .access_token
            .as_ref()
            .ok_or_else(|| ProviderError::Authentication("not authenticated".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ProviderError::Internal(format!("invalid header: {}", e)))?,
        );
        Ok(headers)
    }

    /// Makes an authenticated GET request to the Gmail API.
    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", GMAIL_API_BASE, endpoint);
        let headers = self.auth_headers()?;

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Makes an authenticated POST request to the Gmail API.
    async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", GMAIL_API_BASE, endpoint);
        let mut headers = self.auth_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Makes an authenticated POST request whose response body is ignored.
    async fn post_no_response<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<()> {
        let url = format!("{}{}", GMAIL_API_BASE, endpoint);
        let mut headers = self.auth_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }
        Ok(())
    }

    /// Handles API response, checking for errors.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Internal(format!("parse response: {}", e)))
    }

    /// Handles API error responses.
    async fn handle_error(&self, response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            400 => ProviderError::InvalidRequest(body),
            401 => ProviderError::Authentication(format!("unauthorized: {}", body)),
            404 => ProviderError::NotFound(body),
            429 => ProviderError::RateLimited {
                retry_after_secs: retry_after,
            },
            _ => ProviderError::Internal(format!("API error ({}): {}", status, body)),
        }
    }

    /// Collects attachment parts from a payload tree, depth first.
    fn collect_attachments(part: &GmailPart, out: &mut Vec<AttachmentMeta>) {
        let filename = part.filename.as_deref().unwrap_or("");
        let attachment_id = part.body.as_ref().and_then(|b| b.attachment_id.as_deref());

        if let (false, Some(id)) = (filename.is_empty(), attachment_id) {
            out.push(AttachmentMeta {
                id: id.to_string(),
                filename: filename.to_string(),
                content_type: part.mime_type.clone().unwrap_or_default(),
                size_bytes: part.body.as_ref().and_then(|b| b.size).unwrap_or(0),
            });
        }

        for nested in part.parts.iter().flatten() {
            Self::collect_attachments(nested, out);
        }
    }

    /// Converts a Gmail message to the pipeline's message type.
    fn to_inbox_message(msg: GmailMessage) -> InboxMessage {
        let payload = msg.payload.as_ref();
        let get_header = |name: &str| -> Option<String> {
            payload
                .and_then(|p| p.headers.as_ref())
                .and_then(|h| {
                    h.iter()
                        .find(|hdr| hdr.name.eq_ignore_ascii_case(name))
                        .map(|hdr| hdr.value.clone())
                })
        };

        let from = get_header("From")
            .map(|v| Address::parse(&v))
            .unwrap_or_else(|| Address::new("unknown@unknown.com"));
        let subject = get_header("Subject");

        let unread = system_labels::unread().0;
        let is_read = !msg
            .label_ids
            .as_ref()
            .map(|labels| labels.iter().any(|l| *l == unread))
            .unwrap_or(false);

        let mut attachments = Vec::new();
        if let Some(payload) = payload {
            Self::collect_attachments(payload, &mut attachments);
        }

        InboxMessage {
            id: EmailId::from(msg.id),
            thread_id: ThreadId::from(msg.thread_id),
            from,
            subject,
            is_read,
            attachments,
        }
    }

    /// Builds an RFC 5322 plain-text message. Gmail fills in `From` for the
    /// authenticated account.
    fn build_raw_message(email: &OutgoingEmail) -> String {
        let mut message = String::new();

        let to_addrs: Vec<String> = email.to.iter().map(Address::display).collect();
        message.push_str(&format!("To: {}\r\n", to_addrs.join(", ")));
        message.push_str(&format!("Subject: {}\r\n", email.subject));
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        message.push_str("\r\n");
        message.push_str(&email.body_text);

        message
    }
}

/// Decodes Gmail's base64url attachment data, which may or may not be padded.
fn decode_attachment_data(data: &str) -> Result<Vec<u8>> {
    BASE64_URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .map_err(|e| ProviderError::Internal(format!("decode attachment: {}", e)))
}

#[async_trait]
impl InboxProvider for GmailProvider {
    async fn find_label(&self, name: &str) -> Result<Option<Label>> {
        let response: LabelsListResponse = self.get("/labels", &[]).await?;

        Ok(response
            .labels
            .unwrap_or_default()
            .into_iter()
            .find(|l| l.name == name)
            .map(|l| Label::new(l.id, l.name)))
    }

    async fn create_label(&self, name: &str) -> Result<Label> {
        let body = CreateLabelRequest {
            name,
            label_list_visibility: "labelShow",
            message_list_visibility: "show",
        };
        let label: GmailLabel = self.post("/labels", &body).await?;

        tracing::info!(label = %label.name, label_id = %label.id, "Created Gmail label");
        Ok(Label::new(label.id, label.name))
    }

    async fn search_threads(&self, query: &str, limit: u32) -> Result<Vec<ThreadId>> {
        let response: ThreadListResponse = self
            .get(
                "/threads",
                &[("q", query.to_string()), ("maxResults", limit.to_string())],
            )
            .await?;

        Ok(response
            .threads
            .unwrap_or_default()
            .into_iter()
            .take(limit as usize)
            .map(|t| ThreadId::from(t.id))
            .collect())
    }

    async fn fetch_thread(&self, thread_id: &ThreadId) -> Result<Vec<InboxMessage>> {
        let endpoint = format!("/threads/{}", thread_id.0);
        let response: GmailThread = self
            .get(&endpoint, &[("format", "full".to_string())])
            .await?;

        tracing::debug!(thread_id = %response.id, "Fetched thread");

        Ok(response
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(Self::to_inbox_message)
            .collect())
    }

    async fn fetch_attachment(
        &self,
        message: &InboxMessage,
        attachment: &AttachmentMeta,
    ) -> Result<CandidateAttachment> {
        let endpoint = format!("/messages/{}/attachments/{}", message.id.0, attachment.id);
        let response: AttachmentResponse = self.get(&endpoint, &[]).await?;

        Ok(CandidateAttachment {
            message_id: message.id.clone(),
            filename: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
            data: decode_attachment_data(&response.data)?,
        })
    }

    async fn mark_read(&self, message_id: &EmailId) -> Result<()> {
        let endpoint = format!("/messages/{}/modify", message_id.0);
        let body = ModifyRequest {
            add_label_ids: vec![],
            remove_label_ids: vec![system_labels::unread().0],
        };

        self.post_no_response(&endpoint, &body).await
    }

    async fn swap_thread_label(
        &self,
        thread_id: &ThreadId,
        remove: &LabelId,
        add: &LabelId,
    ) -> Result<()> {
        let endpoint = format!("/threads/{}/modify", thread_id.0);
        let body = ModifyRequest {
            add_label_ids: vec![add.0.clone()],
            remove_label_ids: vec![remove.0.clone()],
        };

        self.post_no_response(&endpoint, &body).await
    }

    async fn send_email(&self, email: &OutgoingEmail) -> Result<String> {
        let raw_message = Self::build_raw_message(email);
        let encoded = BASE64_URL_SAFE_NO_PAD.encode(raw_message.as_bytes());

        #[derive(Serialize)]
        struct SendRequest {
            raw: String,
        }

        #[derive(Deserialize)]
        struct SendResponse {
            id: String,
        }

        let response: SendResponse = self
            .post("/messages/send", &SendRequest { raw: encoded })
            .await?;

        tracing::info!(message_id = %response.id, "Email sent via Gmail API");
        Ok(response.id)
    }
}
