//! Domain layer types for the contract intake pipeline.
//!
//! Inbox entities (messages, labels, attachments), the extraction document
//! returned by the language model, the flattened row persisted per document,
//! and the per-run summary.

mod attachment;
mod email;
mod extraction;
mod label;
mod row;
mod summary;
mod types;

pub use attachment::{
    AttachmentMeta, CandidateAttachment, EncodedDocument, MAX_ATTACHMENT_BYTES, PDF_MEDIA_TYPE,
};
pub use email::{Address, InboxMessage};
pub use extraction::{
    Agent, Contingencies, ContractDates, ExtractionResult, Financing, HomeWarranty, Parties,
    PriceTerms, PropertyDetails, PropertyInfo, Settlement,
};
pub use label::{system_labels, Label};
pub use row::{cell_text, normalize_address, ContractRow, Record};
pub use summary::{FailedEntry, ProcessedEntry, RunSummary};
pub use types::{EmailId, LabelId, ThreadId};
