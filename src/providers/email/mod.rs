//! Inbox provider implementations.
//!
//! This module contains the [`InboxProvider`] trait and the Gmail REST
//! implementation used by the intake pipeline:
//!
//! - [`GmailProvider`] - Gmail API with OAuth 2.0 refresh tokens
//!
//! # Example
//!
//! ```ignore
//! use contract_intake::providers::email::{GmailProvider, InboxProvider, unread_in_label_query};
//!
//! async fn pending(provider: &dyn InboxProvider) {
//!     let threads = provider
//!         .search_threads(&unread_in_label_query("Contracts/To Process"), 10)
//!         .await
//!         .expect("failed to search threads");
//!
//!     for thread in threads {
//!         println!("{}", thread);
//!     }
//! }
//! ```

mod gmail;
mod traits;

pub use gmail::{GmailCredentials, GmailProvider};
pub use traits::{unread_in_label_query, InboxProvider, OutgoingEmail, ProviderError, Result};
