//! Pipeline settings and configuration types.
//!
//! Settings are read from `settings.json` in the platform config directory
//! (or a path given on the command line), then environment overrides are
//! applied. The result is built once per invocation and not mutated after.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MAX_ATTACHMENT_BYTES;
use crate::providers::ai::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::storage::KeychainAccess;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no platform config directory available")]
    NoConfigDir,
}

/// Top-level pipeline settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Extraction endpoint configuration.
    pub anthropic: AnthropicSettings,
    /// Monitored mailbox configuration.
    pub inbox: InboxSettings,
    /// Run summary delivery.
    pub notifications: NotificationSettings,
    /// Row store location.
    pub storage: StorageSettings,
    /// HTTP adapter.
    pub server: ServerSettings,
}

/// Extraction endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicSettings {
    /// Model identifier sent with every request.
    pub model: String,
    /// Output token budget.
    pub max_tokens: u32,
    /// Custom API host, if not the public endpoint.
    pub base_url: Option<String>,
    /// Keychain entry holding the API key.
    pub api_key_keychain_id: String,
    /// API key resolved from the environment. Never written back to disk.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: None,
            api_key_keychain_id: KeychainAccess::ANTHROPIC_API_KEY.to_string(),
            api_key: None,
        }
    }
}

/// Monitored mailbox configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxSettings {
    /// Label whose unread threads are processed.
    pub label: String,
    /// Label applied to threads once processed.
    pub processed_label: String,
    /// Maximum threads handled per run.
    pub max_threads: u32,
    /// Attachments larger than this are rejected without extraction.
    pub max_attachment_bytes: u64,
}

impl Default for InboxSettings {
    fn default() -> Self {
        Self {
            label: "Contracts/To Process".to_string(),
            processed_label: "Contracts/Processed".to_string(),
            max_threads: 10,
            max_attachment_bytes: MAX_ATTACHMENT_BYTES,
        }
    }
}

/// Run summary delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Recipient of the per-run summary. No email is sent when unset.
    pub notify_email: Option<String>,
}

/// Row store location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite file. Defaults to `rows.db` in the platform data directory.
    pub database_path: Option<PathBuf>,
}

/// HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address the adapter listens on.
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from the platform default location.
    ///
    /// A missing file yields defaults. Environment overrides are applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        let mut settings = Self::from_file(&path)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Reads a settings file, returning defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.anthropic.api_key = Some(key);
        }
        if let Some(model) = get("INTAKE_MODEL") {
            self.anthropic.model = model;
        }
        if let Some(label) = get("INTAKE_LABEL") {
            self.inbox.label = label;
        }
        if let Some(label) = get("INTAKE_PROCESSED_LABEL") {
            self.inbox.processed_label = label;
        }
        if let Some(email) = get("INTAKE_NOTIFY_EMAIL") {
            self.notifications.notify_email = Some(email);
        }
    }

    /// Resolved database path.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.database_path {
            Some(p) => Ok(p.clone()),
            None => Ok(project_dirs()?.data_dir().join("rows.db")),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs, ConfigError> {
    directories::ProjectDirs::from("com", "contract-intake", "contract-intake")
        .ok_or(ConfigError::NoConfigDir)
}

/// Platform location of `settings.json`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_settings_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.anthropic.model, "claude-sonnet-4-20250514");
        assert_eq!(settings.anthropic.max_tokens, 4096);
        assert_eq!(settings.inbox.label, "Contracts/To Process");
        assert_eq!(settings.inbox.processed_label, "Contracts/Processed");
        assert_eq!(settings.inbox.max_threads, 10);
        assert_eq!(settings.inbox.max_attachment_bytes, 20 * 1024 * 1024);
        assert!(settings.notifications.notify_email.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"inbox": {"max_threads": 3}}"#).unwrap();
        assert_eq!(settings.inbox.max_threads, 3);
        assert_eq!(settings.inbox.label, "Contracts/To Process");
        assert_eq!(settings.anthropic.model, DEFAULT_MODEL);
    }

    #[test]
    fn api_key_is_never_serialized() {
        let mut settings = Settings::default();
        settings.anthropic.api_key = Some("sk-secret".to_string());
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("INTAKE_LABEL", "Offers"),
            ("INTAKE_PROCESSED_LABEL", "Offers/Done"),
            ("INTAKE_NOTIFY_EMAIL", "broker@example.com"),
            ("INTAKE_MODEL", "claude-test"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.anthropic.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.anthropic.model, "claude-test");
        assert_eq!(settings.inbox.label, "Offers");
        assert_eq!(settings.inbox.processed_label, "Offers/Done");
        assert_eq!(
            settings.notifications.notify_email.as_deref(),
            Some("broker@example.com")
        );
    }

    #[test]
    fn empty_override_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(|k| (k == "INTAKE_LABEL").then(|| "  ".to_string()));
        assert_eq!(settings.inbox.label, "Contracts/To Process");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn explicit_database_path_wins() {
        let mut settings = Settings::default();
        settings.storage.database_path = Some(PathBuf::from("/tmp/rows.db"));
        assert_eq!(settings.database_path().unwrap(), PathBuf::from("/tmp/rows.db"));
    }
}
