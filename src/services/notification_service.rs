//! Run summary notification.
//!
//! Composes one plain-text email per run listing committed rows, duplicates
//! that were skipped, and failures, and sends it through the inbox provider.

use std::sync::Arc;

use crate::domain::{Address, RunSummary};
use crate::providers::email::{InboxProvider, OutgoingEmail, Result};

/// Sends the per-run summary to a configured recipient.
pub struct NotificationService {
    inbox: Arc<dyn InboxProvider>,
    recipient: Option<String>,
}

impl NotificationService {
    pub fn new(inbox: Arc<dyn InboxProvider>, recipient: Option<String>) -> Self {
        Self { inbox, recipient }
    }

    /// Sends the summary if a recipient is configured and the run did anything.
    ///
    /// Returns the sent message ID, or `None` when nothing was sent.
    pub async fn notify(&self, summary: &RunSummary) -> Result<Option<String>> {
        let Some(recipient) = self.recipient.as_deref().filter(|r| !r.trim().is_empty()) else {
            tracing::debug!("No notification recipient configured");
            return Ok(None);
        };
        if summary.is_empty() {
            tracing::debug!("Empty run, no notification sent");
            return Ok(None);
        }

        let email = compose_summary(summary, recipient);
        let id = self.inbox.send_email(&email).await?;
        tracing::info!(
            recipient,
            committed = summary.committed(),
            skipped = summary.skipped(),
            failed = summary.failures.len(),
            "Sent run summary"
        );
        Ok(Some(id))
    }
}

/// Builds the summary email.
pub fn compose_summary(summary: &RunSummary, recipient: &str) -> OutgoingEmail {
    let subject = format!(
        "Contract intake: {} added, {} duplicate, {} failed",
        summary.committed(),
        summary.skipped(),
        summary.failures.len()
    );

    let mut body = String::new();

    if !summary.successes.is_empty() {
        body.push_str(&format!("Processed ({}):\n", summary.successes.len()));
        for entry in &summary.successes {
            let address = if entry.address.is_empty() {
                "(no address)"
            } else {
                entry.address.as_str()
            };
            body.push_str(&format!("- {} | {}", entry.filename, address));
            if let Some(price) = entry.price {
                body.push_str(&format!(" | {}", format_price(price)));
            }
            if entry.skipped {
                body.push_str(" [duplicate, not added]");
            }
            body.push_str(&format!("\n  Subject: {}\n", entry.subject));
        }
    }

    if !summary.failures.is_empty() {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&format!("Failed ({}):\n", summary.failures.len()));
        for entry in &summary.failures {
            body.push_str(&format!("- {}: {}\n", entry.filename, entry.error));
            body.push_str(&format!("  Subject: {}\n", entry.subject));
        }
    }

    OutgoingEmail {
        to: vec![Address::new(recipient.trim())],
        subject,
        body_text: body,
    }
}

/// Whole dollars with thousands separators, e.g. `$1,250,000`.
fn format_price(price: f64) -> String {
    let dollars = price.round() as i64;
    let digits = dollars.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if dollars < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
