//! Keychain access for pipeline credentials.
//!
//! Wraps the keyring crate so the API key and Gmail OAuth credentials are
//! stored once by `setup` and read back on every run.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during keychain operations.
#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Stored credential {key} is not valid JSON: {source}")]
    InvalidJson {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to spawn blocking task: {0}")]
    TaskFailed(String),
}

/// Result type for keychain operations.
pub type Result<T> = std::result::Result<T, KeychainError>;

/// OS keychain entries under one service namespace.
#[derive(Debug, Clone)]
pub struct KeychainAccess {
    service_name: String,
}

impl KeychainAccess {
    pub const DEFAULT_SERVICE: &'static str = "com.contract-intake";

    /// Entry holding the Anthropic API key.
    pub const ANTHROPIC_API_KEY: &'static str = "anthropic.api_key";

    /// Entry holding the Gmail OAuth credentials as JSON.
    pub const GMAIL_CREDENTIALS: &'static str = "gmail.credentials";

    pub fn new() -> Self {
        Self::with_service(Self::DEFAULT_SERVICE)
    }

    /// Uses a custom service name, keeping test entries away from real ones.
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Stores a credential, overwriting any existing value.
    pub async fn store(&self, key: &str, value: &str) -> Result<()> {
        let service = self.service_name.clone();
        let key = key.to_string();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &key)?;
            entry.set_password(&value)?;
            Ok(())
        })
        .await
        .map_err(|e| KeychainError::TaskFailed(e.to_string()))?
    }

    /// Retrieves a credential. Returns `None` if the entry does not exist.
    pub async fn retrieve(&self, key: &str) -> Result<Option<String>> {
        let service = self.service_name.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &key)?;
            match entry.get_password() {
                Ok(password) => Ok(Some(password)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(KeychainError::Keyring(e)),
            }
        })
        .await
        .map_err(|e| KeychainError::TaskFailed(e.to_string()))?
    }

    /// Retrieves a credential that must exist.
    pub async fn require(&self, key: &str) -> Result<String> {
        self.retrieve(key)
            .await?
            .ok_or_else(|| KeychainError::NotFound(key.to_string()))
    }

    /// Serializes `value` as JSON and stores it.
    pub async fn store_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(|source| KeychainError::InvalidJson {
            key: key.to_string(),
            source,
        })?;
        self.store(key, &json).await
    }

    /// Retrieves a required JSON credential and deserializes it.
    pub async fn require_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let raw = self.require(key).await?;
        decode_json(key, &raw)
    }

    /// Deletes a credential. Errors if it does not exist.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let service = self.service_name.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &key)?;
            match entry.delete_credential() {
                Ok(()) => Ok(()),
                Err(keyring::Error::NoEntry) => Err(KeychainError::NotFound(key)),
                Err(e) => Err(KeychainError::Keyring(e)),
            }
        })
        .await
        .map_err(|e| KeychainError::TaskFailed(e.to_string()))?
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Default for KeychainAccess {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|source| KeychainError::InvalidJson {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::email::GmailCredentials;

    #[test]
    fn default_service_name() {
        let keychain = KeychainAccess::new();
        assert_eq!(keychain.service_name(), "com.contract-intake");
    }

    #[test]
    fn custom_service_name() {
        let keychain = KeychainAccess::with_service("test.service");
        assert_eq!(keychain.service_name(), "test.service");
    }

    #[test]
    fn gmail_credentials_decode() {
        let creds: GmailCredentials = decode_json(
            KeychainAccess::GMAIL_CREDENTIALS,
            r#"{"refresh_token":"r","client_id":"c","client_secret":"s"}"#,
        )
        .unwrap();
        assert_eq!(creds.refresh_token, "r");
        assert_eq!(creds.client_id, "c");
        assert_eq!(creds.client_secret, "s");
    }

    #[test]
    fn invalid_json_names_the_entry() {
        let err = decode_json::<GmailCredentials>("gmail.credentials", "{").unwrap_err();
        assert!(err.to_string().contains("gmail.credentials"));
    }

    // Run with: cargo test --features keychain-integration-tests -- --ignored
    #[cfg(feature = "keychain-integration-tests")]
    mod integration {
        use super::*;

        #[tokio::test]
        #[ignore = "requires OS keychain access"]
        async fn store_require_delete_cycle() {
            let keychain = KeychainAccess::with_service("com.contract-intake.test");
            let key = "test-credential";

            keychain.store(key, "test-secret-value").await.unwrap();
            assert_eq!(keychain.require(key).await.unwrap(), "test-secret-value");

            keychain.delete(key).await.unwrap();
            assert!(matches!(
                keychain.require(key).await,
                Err(KeychainError::NotFound(_))
            ));
        }
    }
}
