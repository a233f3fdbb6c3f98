//! Inbox pipeline orchestration.
//!
//! The [`IntakeService`] performs one bounded run: it resolves the monitored
//! and processed labels, walks unread threads in the monitored label, sends
//! each PDF attachment through extraction, mapping and deduplication, commits
//! new rows, marks messages read, moves threads to the processed label and
//! finally notifies a configured recipient.
//!
//! Failures while resolving labels or searching abort the run. Everything
//! after that is handled per attachment and recorded in the [`RunSummary`].

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use super::dedup::is_duplicate;
use super::notification_service::NotificationService;
use super::retry::{extract_with_retry, RetryPolicy};
use super::row_mapper::{map_row, MessageContext};
use crate::config::Settings;
use crate::domain::{
    AttachmentMeta, ExtractionResult, FailedEntry, InboxMessage, Label, ProcessedEntry,
    RunSummary, ThreadId, MAX_ATTACHMENT_BYTES,
};
use crate::providers::ai::{DocumentExtractor, ExtractionError};
use crate::providers::email::{unread_in_label_query, InboxProvider, ProviderError};
use crate::storage::{RowStore, StoreError};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("failed to resolve label {label}: {source}")]
    Label {
        label: String,
        #[source]
        source: ProviderError,
    },

    #[error("thread search failed: {0}")]
    Search(#[source] ProviderError),
}

/// Why a single attachment could not be processed.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("download failed: {0}")]
    Download(#[from] ProviderError),

    #[error("row store error: {0}")]
    Store(#[from] StoreError),
}

/// Run parameters, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeSettings {
    pub label: String,
    pub processed_label: String,
    pub max_threads: u32,
    pub max_attachment_bytes: u64,
    pub retry: RetryPolicy,
    pub notify_email: Option<String>,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for IntakeSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            label: settings.inbox.label.clone(),
            processed_label: settings.inbox.processed_label.clone(),
            max_threads: settings.inbox.max_threads,
            max_attachment_bytes: settings.inbox.max_attachment_bytes.min(MAX_ATTACHMENT_BYTES),
            retry: RetryPolicy::default(),
            notify_email: settings.notifications.notify_email.clone(),
        }
    }
}

/// Runs the intake pipeline against an inbox, an extractor and a row store.
pub struct IntakeService {
    inbox: Arc<dyn InboxProvider>,
    extractor: Arc<dyn DocumentExtractor>,
    store: Arc<dyn RowStore>,
    notifier: NotificationService,
    settings: IntakeSettings,
}

impl IntakeService {
    pub fn new(
        inbox: Arc<dyn InboxProvider>,
        extractor: Arc<dyn DocumentExtractor>,
        store: Arc<dyn RowStore>,
        settings: IntakeSettings,
    ) -> Self {
        let notifier = NotificationService::new(inbox.clone(), settings.notify_email.clone());
        Self {
            inbox,
            extractor,
            store,
            notifier,
            settings,
        }
    }

    /// Performs one run and returns what happened.
    pub async fn run(&self) -> Result<RunSummary, IntakeError> {
        let (unprocessed, created) = self.resolve_label(&self.settings.label).await?;
        if created {
            tracing::info!(
                label = %unprocessed.name,
                "Created monitored label; nothing to process on first run"
            );
            return Ok(RunSummary::default());
        }

        let (processed, _) = self.resolve_label(&self.settings.processed_label).await?;

        let query = unread_in_label_query(&unprocessed.name);
        let threads = self
            .inbox
            .search_threads(&query, self.settings.max_threads)
            .await
            .map_err(IntakeError::Search)?;

        tracing::info!(threads = threads.len(), query = %query, "Starting intake run");

        let mut summary = RunSummary::default();
        for thread_id in &threads {
            self.process_thread(thread_id, &unprocessed, &processed, &mut summary)
                .await;
        }

        if let Err(e) = self.notifier.notify(&summary).await {
            tracing::error!(error = %e, "Failed to send run summary");
        }

        tracing::info!(
            committed = summary.committed(),
            skipped = summary.skipped(),
            failed = summary.failures.len(),
            "Intake run complete"
        );
        Ok(summary)
    }

    /// Finds a label by name, creating it if absent. The flag is true if it
    /// was created.
    async fn resolve_label(&self, name: &str) -> Result<(Label, bool), IntakeError> {
        let to_error = |source| IntakeError::Label {
            label: name.to_string(),
            source,
        };

        if let Some(label) = self.inbox.find_label(name).await.map_err(to_error)? {
            return Ok((label, false));
        }

        let label = self.inbox.create_label(name).await.map_err(to_error)?;
        Ok((label, true))
    }

    async fn process_thread(
        &self,
        thread_id: &ThreadId,
        unprocessed: &Label,
        processed: &Label,
        summary: &mut RunSummary,
    ) {
        let messages = match self.inbox.fetch_thread(thread_id).await {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(thread_id = %thread_id, error = %e, "Failed to fetch thread");
                return;
            }
        };

        for message in messages.iter().filter(|m| !m.is_read) {
            self.process_message(message, summary).await;
        }

        if let Err(e) = self
            .inbox
            .swap_thread_label(thread_id, &unprocessed.id, &processed.id)
            .await
        {
            tracing::error!(thread_id = %thread_id, error = %e, "Failed to relabel thread");
        }
    }

    async fn process_message(&self, message: &InboxMessage, summary: &mut RunSummary) {
        let documents: Vec<&AttachmentMeta> = message
            .attachments
            .iter()
            .filter(|a| a.is_document())
            .collect();

        if documents.is_empty() {
            tracing::debug!(message_id = %message.id, "No PDF attachments");
        }

        for attachment in documents {
            match self.process_attachment(message, attachment).await {
                Ok(entry) => summary.successes.push(entry),
                Err(e) => {
                    tracing::warn!(
                        message_id = %message.id,
                        filename = %attachment.filename,
                        error = %e,
                        "Attachment failed"
                    );
                    summary.failures.push(FailedEntry {
                        filename: attachment.filename.clone(),
                        subject: message.subject_or_empty().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if let Err(e) = self.inbox.mark_read(&message.id).await {
            tracing::error!(message_id = %message.id, error = %e, "Failed to mark message read");
        }
    }

    async fn process_attachment(
        &self,
        message: &InboxMessage,
        attachment: &AttachmentMeta,
    ) -> Result<ProcessedEntry, AttachmentError> {
        let limit = self.settings.max_attachment_bytes;
        self.check_size(attachment.size_bytes)?;

        let candidate = self.inbox.fetch_attachment(message, attachment).await?;
        self.check_size(candidate.size_bytes())?;

        tracing::debug!(
            filename = %candidate.filename,
            bytes = candidate.size_bytes(),
            limit,
            "Extracting attachment"
        );

        let document = candidate.encode();
        let value =
            extract_with_retry(self.extractor.as_ref(), &document, self.settings.retry).await?;
        let extraction = ExtractionResult::from_value(value)
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        let context = MessageContext {
            filename: attachment.filename.clone(),
            subject: message.subject_or_empty().to_string(),
            sender: message.from.email.clone(),
        };
        let row = map_row(&extraction, &context, Utc::now());

        let skipped =
            is_duplicate(self.store.as_ref(), &row.property_address, &row.contract_date).await?;
        if skipped {
            tracing::info!(
                address = %row.property_address,
                contract_date = %row.contract_date,
                "Duplicate contract, not committed"
            );
        } else {
            self.store.append(&row.to_record()).await?;
            tracing::info!(address = %row.property_address, "Committed contract row");
        }

        Ok(ProcessedEntry {
            filename: attachment.filename.clone(),
            subject: context.subject,
            address: row.property_address,
            price: row.offer_price,
            skipped,
        })
    }

    fn check_size(&self, size: u64) -> Result<(), ExtractionError> {
        let limit = self.settings.max_attachment_bytes;
        if size > limit {
            return Err(ExtractionError::AttachmentTooLarge { size, limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, CandidateAttachment, EmailId, LabelId};
    use crate::providers::ai::MockDocumentExtractor;
    use crate::providers::email::{OutgoingEmail, Result as ProviderResult};
    use crate::storage::MemoryRowStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InboxState {
        labels: Vec<Label>,
        created: Vec<String>,
        threads: Vec<(ThreadId, Vec<InboxMessage>)>,
        attachments: HashMap<String, Vec<u8>>,
        queries: Vec<String>,
        read: Vec<EmailId>,
        swaps: Vec<(ThreadId, LabelId, LabelId)>,
        sent: Vec<OutgoingEmail>,
        fail_search: bool,
        fail_labels: bool,
    }

    #[derive(Default)]
    struct FakeInbox {
        state: Mutex<InboxState>,
    }

    impl FakeInbox {
        fn with_labels() -> Self {
            let inbox = Self::default();
            {
                let mut state = inbox.state.lock().unwrap();
                state.labels.push(Label::new("Label_1", "Contracts/To Process"));
                state.labels.push(Label::new("Label_2", "Contracts/Processed"));
            }
            inbox
        }

        fn add_thread(&self, thread: &str, messages: Vec<InboxMessage>) {
            self.state
                .lock()
                .unwrap()
                .threads
                .push((ThreadId::from(thread), messages));
        }

        fn add_attachment(&self, id: &str, data: Vec<u8>) {
            self.state
                .lock()
                .unwrap()
                .attachments
                .insert(id.to_string(), data);
        }
    }

    #[async_trait]
    impl InboxProvider for FakeInbox {
        async fn find_label(&self, name: &str) -> ProviderResult<Option<Label>> {
            let state = self.state.lock().unwrap();
            if state.fail_labels {
                return Err(ProviderError::Authentication("token revoked".to_string()));
            }
            Ok(state.labels.iter().find(|l| l.name == name).cloned())
        }

        async fn create_label(&self, name: &str) -> ProviderResult<Label> {
            let mut state = self.state.lock().unwrap();
            let label = Label::new(format!("Label_{}", state.labels.len() + 1), name);
            state.labels.push(label.clone());
            state.created.push(name.to_string());
            Ok(label)
        }

        async fn search_threads(&self, query: &str, limit: u32) -> ProviderResult<Vec<ThreadId>> {
            let mut state = self.state.lock().unwrap();
            if state.fail_search {
                return Err(ProviderError::Connection("offline".to_string()));
            }
            state.queries.push(query.to_string());
            Ok(state
                .threads
                .iter()
                .take(limit as usize)
                .map(|(id, _)| id.clone())
                .collect())
        }

        async fn fetch_thread(&self, thread_id: &ThreadId) -> ProviderResult<Vec<InboxMessage>> {
            let state = self.state.lock().unwrap();
            state
                .threads
                .iter()
                .find(|(id, _)| id == thread_id)
                .map(|(_, messages)| messages.clone())
                .ok_or_else(|| ProviderError::NotFound(thread_id.to_string()))
        }

        async fn fetch_attachment(
            &self,
            message: &InboxMessage,
            attachment: &AttachmentMeta,
        ) -> ProviderResult<CandidateAttachment> {
            let state = self.state.lock().unwrap();
            let data = state
                .attachments
                .get(&attachment.id)
                .cloned()
                .ok_or_else(|| ProviderError::NotFound(attachment.id.clone()))?;
            Ok(CandidateAttachment {
                message_id: message.id.clone(),
                filename: attachment.filename.clone(),
                content_type: attachment.content_type.clone(),
                data,
            })
        }

        async fn mark_read(&self, message_id: &EmailId) -> ProviderResult<()> {
            self.state.lock().unwrap().read.push(message_id.clone());
            Ok(())
        }

        async fn swap_thread_label(
            &self,
            thread_id: &ThreadId,
            remove: &LabelId,
            add: &LabelId,
        ) -> ProviderResult<()> {
            self.state
                .lock()
                .unwrap()
                .swaps
                .push((thread_id.clone(), remove.clone(), add.clone()));
            Ok(())
        }

        async fn send_email(&self, email: &OutgoingEmail) -> ProviderResult<String> {
            let mut state = self.state.lock().unwrap();
            state.sent.push(email.clone());
            Ok(format!("sent-{}", state.sent.len()))
        }
    }

    fn pdf(id: &str, filename: &str, size: u64) -> AttachmentMeta {
        AttachmentMeta {
            id: id.to_string(),
            filename: filename.to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: size,
        }
    }

    fn message(id: &str, attachments: Vec<AttachmentMeta>) -> InboxMessage {
        InboxMessage {
            id: EmailId::from(id),
            thread_id: ThreadId::from("t-1"),
            from: Address::new("agent@realty.com"),
            subject: Some("Offer on Main".to_string()),
            is_read: false,
            attachments,
        }
    }

    fn contract_json() -> serde_json::Value {
        json!({
            "property": {"street": "123 Main St"},
            "price_terms": {"offer_price": 500000},
            "dates": {"contract_date": "2024-01-05"}
        })
    }

    fn extractor_returning(value: serde_json::Value) -> MockDocumentExtractor {
        let mut mock = MockDocumentExtractor::new();
        mock.expect_extract().returning(move |_| Ok(value.clone()));
        mock
    }

    fn service(
        inbox: Arc<FakeInbox>,
        extractor: MockDocumentExtractor,
        store: Arc<MemoryRowStore>,
        settings: IntakeSettings,
    ) -> IntakeService {
        IntakeService::new(inbox, Arc::new(extractor), store, settings)
    }

    #[tokio::test]
    async fn first_run_creates_label_and_stops() {
        let inbox = Arc::new(FakeInbox::default());
        let mut extractor = MockDocumentExtractor::new();
        extractor.expect_extract().never();

        let summary = service(
            inbox.clone(),
            extractor,
            Arc::new(MemoryRowStore::new()),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap();

        assert!(summary.is_empty());
        let state = inbox.state.lock().unwrap();
        assert_eq!(state.created, vec!["Contracts/To Process".to_string()]);
        assert!(state.queries.is_empty());
    }

    #[tokio::test]
    async fn missing_processed_label_is_created() {
        let inbox = Arc::new(FakeInbox::default());
        inbox
            .state
            .lock()
            .unwrap()
            .labels
            .push(Label::new("Label_9", "Contracts/To Process"));

        service(
            inbox.clone(),
            MockDocumentExtractor::new(),
            Arc::new(MemoryRowStore::new()),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap();

        let state = inbox.state.lock().unwrap();
        assert_eq!(state.created, vec!["Contracts/Processed".to_string()]);
        assert_eq!(
            state.queries,
            vec!["label:\"Contracts/To Process\" is:unread".to_string()]
        );
    }

    #[tokio::test]
    async fn committed_row_is_stored_and_thread_relabeled() {
        let inbox = Arc::new(FakeInbox::with_labels());
        inbox.add_thread("t-1", vec![message("m-1", vec![pdf("a-1", "offer.pdf", 4)])]);
        inbox.add_attachment("a-1", b"%PDF".to_vec());
        let store = Arc::new(MemoryRowStore::new());

        let summary = service(
            inbox.clone(),
            extractor_returning(contract_json()),
            store.clone(),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(summary.committed(), 1);
        assert_eq!(summary.successes[0].address, "123 Main St");
        assert_eq!(summary.successes[0].price, Some(500000.0));

        let rows = store.rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Property Address"], json!("123 Main St"));
        assert_eq!(rows[0]["Offer Price"], json!(500000));

        let state = inbox.state.lock().unwrap();
        assert_eq!(state.read, vec![EmailId::from("m-1")]);
        assert_eq!(
            state.swaps,
            vec![(
                ThreadId::from("t-1"),
                LabelId::from("Label_1"),
                LabelId::from("Label_2")
            )]
        );
    }

    #[tokio::test]
    async fn oversized_attachment_fails_without_extraction() {
        let inbox = Arc::new(FakeInbox::with_labels());
        inbox.add_thread(
            "t-1",
            vec![message("m-1", vec![pdf("a-1", "scan.pdf", 21_000_000)])],
        );
        let mut extractor = MockDocumentExtractor::new();
        extractor.expect_extract().never();

        let summary = service(
            inbox.clone(),
            extractor,
            Arc::new(MemoryRowStore::new()),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap();

        assert!(summary.successes.is_empty());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].filename, "scan.pdf");
        assert!(summary.failures[0].error.contains("too large"));
        assert_eq!(inbox.state.lock().unwrap().read, vec![EmailId::from("m-1")]);
    }

    #[tokio::test]
    async fn second_matching_attachment_is_skipped() {
        let inbox = Arc::new(FakeInbox::with_labels());
        inbox.add_thread(
            "t-1",
            vec![message(
                "m-1",
                vec![pdf("a-1", "offer.pdf", 4), pdf("a-2", "offer-signed.pdf", 4)],
            )],
        );
        inbox.add_attachment("a-1", b"%PDF".to_vec());
        inbox.add_attachment("a-2", b"%PDF".to_vec());
        let store = Arc::new(MemoryRowStore::new());

        let summary = service(
            inbox,
            extractor_returning(contract_json()),
            store.clone(),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(summary.successes.len(), 2);
        assert!(!summary.successes[0].skipped);
        assert!(summary.successes[1].skipped);
        assert_eq!(store.rows().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failure_does_not_block_sibling() {
        let inbox = Arc::new(FakeInbox::with_labels());
        inbox.add_thread(
            "t-1",
            vec![message(
                "m-1",
                vec![pdf("a-1", "bad.pdf", 4), pdf("a-2", "good.pdf", 4)],
            )],
        );
        inbox.add_attachment("a-1", b"%PDF".to_vec());
        inbox.add_attachment("a-2", b"%PDF".to_vec());

        let mut extractor = MockDocumentExtractor::new();
        let mut calls = 0;
        extractor.expect_extract().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(ExtractionError::Upstream {
                    status: 400,
                    message: "could not read document".to_string(),
                })
            } else {
                Ok(contract_json())
            }
        });

        let summary = service(
            inbox,
            extractor,
            Arc::new(MemoryRowStore::new()),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].filename, "bad.pdf");
        assert_eq!(summary.failures[0].error, "API error: 400 - could not read document");
        assert_eq!(summary.successes.len(), 1);
        assert_eq!(summary.successes[0].filename, "good.pdf");
    }

    #[tokio::test]
    async fn non_object_extraction_is_malformed() {
        let inbox = Arc::new(FakeInbox::with_labels());
        inbox.add_thread("t-1", vec![message("m-1", vec![pdf("a-1", "offer.pdf", 4)])]);
        inbox.add_attachment("a-1", b"%PDF".to_vec());

        let summary = service(
            inbox,
            extractor_returning(json!("no structured data")),
            Arc::new(MemoryRowStore::new()),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap();

        assert!(summary.failures[0]
            .error
            .starts_with("malformed extraction response"));
    }

    #[tokio::test]
    async fn message_without_pdf_is_only_marked_read() {
        let inbox = Arc::new(FakeInbox::with_labels());
        let image = AttachmentMeta {
            id: "a-1".to_string(),
            filename: "photo.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            size_bytes: 10,
        };
        inbox.add_thread("t-1", vec![message("m-1", vec![image])]);
        let mut extractor = MockDocumentExtractor::new();
        extractor.expect_extract().never();

        let settings = IntakeSettings {
            notify_email: Some("broker@example.com".to_string()),
            ..Default::default()
        };
        let summary = service(inbox.clone(), extractor, Arc::new(MemoryRowStore::new()), settings)
            .run()
            .await
            .unwrap();

        assert!(summary.is_empty());
        let state = inbox.state.lock().unwrap();
        assert_eq!(state.read, vec![EmailId::from("m-1")]);
        assert_eq!(state.swaps.len(), 1);
        assert!(state.sent.is_empty());
    }

    #[tokio::test]
    async fn read_messages_are_skipped() {
        let inbox = Arc::new(FakeInbox::with_labels());
        let mut already_read = message("m-1", vec![pdf("a-1", "offer.pdf", 4)]);
        already_read.is_read = true;
        inbox.add_thread("t-1", vec![already_read]);
        let mut extractor = MockDocumentExtractor::new();
        extractor.expect_extract().never();

        let summary = service(
            inbox.clone(),
            extractor,
            Arc::new(MemoryRowStore::new()),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap();

        assert!(summary.is_empty());
        assert!(inbox.state.lock().unwrap().read.is_empty());
    }

    #[tokio::test]
    async fn summary_is_emailed_when_configured() {
        let inbox = Arc::new(FakeInbox::with_labels());
        inbox.add_thread("t-1", vec![message("m-1", vec![pdf("a-1", "offer.pdf", 4)])]);
        inbox.add_attachment("a-1", b"%PDF".to_vec());

        let settings = IntakeSettings {
            notify_email: Some("broker@example.com".to_string()),
            ..Default::default()
        };
        service(
            inbox.clone(),
            extractor_returning(contract_json()),
            Arc::new(MemoryRowStore::new()),
            settings,
        )
        .run()
        .await
        .unwrap();

        let state = inbox.state.lock().unwrap();
        assert_eq!(state.sent.len(), 1);
        assert_eq!(state.sent[0].to, vec![Address::new("broker@example.com")]);
        assert!(state.sent[0].body_text.contains("123 Main St"));
    }

    #[tokio::test]
    async fn thread_cap_is_passed_to_search() {
        let inbox = Arc::new(FakeInbox::with_labels());
        for n in 0..12 {
            inbox.add_thread(&format!("t-{n}"), vec![]);
        }

        service(
            inbox.clone(),
            MockDocumentExtractor::new(),
            Arc::new(MemoryRowStore::new()),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(inbox.state.lock().unwrap().swaps.len(), 10);
    }

    #[tokio::test]
    async fn search_failure_aborts_run() {
        let inbox = Arc::new(FakeInbox::with_labels());
        inbox.state.lock().unwrap().fail_search = true;

        let err = service(
            inbox,
            MockDocumentExtractor::new(),
            Arc::new(MemoryRowStore::new()),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, IntakeError::Search(_)));
    }

    #[tokio::test]
    async fn label_failure_aborts_run() {
        let inbox = Arc::new(FakeInbox::with_labels());
        inbox.state.lock().unwrap().fail_labels = true;

        let err = service(
            inbox.clone(),
            MockDocumentExtractor::new(),
            Arc::new(MemoryRowStore::new()),
            IntakeSettings::default(),
        )
        .run()
        .await
        .unwrap_err();

        match err {
            IntakeError::Label { label, .. } => assert_eq!(label, "Contracts/To Process"),
            other => panic!("unexpected error: {other}"),
        }
        let state = inbox.state.lock().unwrap();
        assert!(state.queries.is_empty());
        assert!(state.created.is_empty());
    }

    #[tokio::test]
    async fn downloaded_size_is_checked_again() {
        let inbox = Arc::new(FakeInbox::with_labels());
        inbox.add_thread("t-1", vec![message("m-1", vec![pdf("a-1", "scan.pdf", 4)])]);
        inbox.add_attachment("a-1", vec![0u8; 21_000_000]);
        let mut extractor = MockDocumentExtractor::new();
        extractor.expect_extract().never();
        let store = Arc::new(MemoryRowStore::new());

        let summary = service(inbox.clone(), extractor, store.clone(), IntakeSettings::default())
            .run()
            .await
            .unwrap();

        assert!(summary.successes.is_empty());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].filename, "scan.pdf");
        assert!(summary.failures[0].error.contains("too large"));
        assert!(store.rows().await.unwrap().is_empty());
        assert_eq!(inbox.state.lock().unwrap().read, vec![EmailId::from("m-1")]);
    }
}
