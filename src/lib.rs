//! contract-intake - Label-driven purchase agreement intake
//!
//! This crate polls a labeled mailbox for PDF purchase agreements, extracts
//! their terms through the Anthropic Messages API, flattens them into a fixed
//! row, and appends new contracts to a deduplicated row store.

pub mod cli;
pub mod config;
pub mod domain;
pub mod providers;
pub mod server;
pub mod services;
pub mod storage;
