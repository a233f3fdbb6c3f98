//! Inbox and extraction provider implementations.
//!
//! This module contains provider traits and implementations for external services:
//!
//! - [`email`] - Inbox providers (Gmail API)
//! - [`ai`] - Document extraction (Anthropic Messages API)

pub mod ai;
pub mod email;
