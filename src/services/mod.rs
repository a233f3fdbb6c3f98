//! Pipeline services layer.
//!
//! This module contains the services that orchestrate a run, coordinating
//! between providers, storage, and domain types.
//!
//! # Architecture
//!
//! ```text
//! Entry points (CLI run, HTTP adapter)
//!          |
//!          v
//!    Services Layer  <-- You are here
//!          |
//!          v
//! Infrastructure (Providers, Storage)
//! ```
//!
//! # Services Overview
//!
//! - [`IntakeService`]: Runs the label-driven inbox pipeline
//! - [`extract_with_retry`]: Backoff around rate-limited extraction calls
//! - [`map_row`]: Flattens an extraction into the fixed row
//! - [`is_duplicate`]: Address and contract date dedup against the store
//! - [`NotificationService`]: Emails the per-run summary

mod dedup;
mod intake_service;
mod notification_service;
mod retry;
mod row_mapper;

pub use dedup::is_duplicate;
pub use intake_service::{AttachmentError, IntakeError, IntakeService, IntakeSettings};
pub use notification_service::{compose_summary, NotificationService};
pub use retry::{extract_with_retry, RetryPolicy};
pub use row_mapper::{map_row, MessageContext, ANALYZED_AT_FORMAT, STIPULATIONS_MAX_CHARS};
