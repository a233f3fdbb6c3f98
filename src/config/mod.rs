//! Configuration and settings management.
//!
//! This module provides pipeline settings types and loading.
//! Settings are stored in the user's config directory as JSON.

mod settings;

pub use settings::{
    default_config_path, AnthropicSettings, ConfigError, InboxSettings, NotificationSettings,
    ServerSettings, Settings, StorageSettings,
};
