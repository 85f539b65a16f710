//! Token persistence backends.
//!
//! A [`TokenStore`] keeps the OAuth token set for a user between
//! invocations. The file store writes a JSON map next to the
//! configuration file (or wherever `token_persistence_path` points);
//! the keyring store delegates to the operating system keyring.

use crate::configuration::{Configuration, ConfigurationError, PersistenceHandler};
use crate::model::TokenSet;
use keyring::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

pub const KEYRING_SERVICE: &str = "zcrm";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to access the token file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("failed to decode stored tokens: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("keyring error: {0}")]
    KeyringError(#[from] keyring::Error),
}

/// Persistence for OAuth token sets, keyed by user identifier.
pub trait TokenStore: Send + Sync {
    fn get(&self, user: &str) -> Result<Option<TokenSet>, TokenStoreError>;
    fn put(&self, user: &str, tokens: &TokenSet) -> Result<(), TokenStoreError>;
    fn delete(&self, user: &str) -> Result<(), TokenStoreError>;
}

/// Builds the store selected by the configuration's persistence handler.
pub fn from_configuration(
    configuration: &Configuration,
) -> Result<Box<dyn TokenStore>, ConfigurationError> {
    match configuration.persistence_handler {
        PersistenceHandler::File => Ok(Box::new(FileTokenStore::new(
            configuration.resolved_token_persistence_path()?,
        ))),
        PersistenceHandler::Keyring => Ok(Box::new(KeyringTokenStore)),
    }
}

/// Stores token sets as a JSON map of user identifier to token set.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> FileTokenStore {
        FileTokenStore { path }
    }

    fn load(&self) -> Result<HashMap<String, TokenSet>, TokenStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, tokens: &HashMap<String, TokenSet>) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(tokens)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, user: &str) -> Result<Option<TokenSet>, TokenStoreError> {
        Ok(self.load()?.remove(user))
    }

    fn put(&self, user: &str, tokens: &TokenSet) -> Result<(), TokenStoreError> {
        debug!("Persisting tokens for {} to {}...", user, self.path.display());
        let mut all = self.load()?;
        all.insert(user.to_string(), tokens.clone());
        self.store(&all)
    }

    fn delete(&self, user: &str) -> Result<(), TokenStoreError> {
        let mut all = self.load()?;
        if all.remove(user).is_some() {
            self.store(&all)?;
        }
        Ok(())
    }
}

/// Stores the serialized token set in the operating system keyring.
pub struct KeyringTokenStore;

impl TokenStore for KeyringTokenStore {
    fn get(&self, user: &str) -> Result<Option<TokenSet>, TokenStoreError> {
        let entry = Entry::new(KEYRING_SERVICE, user)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(serde_json::from_str(&value)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(TokenStoreError::from(e)),
        }
    }

    fn put(&self, user: &str, tokens: &TokenSet) -> Result<(), TokenStoreError> {
        debug!("Persisting tokens for {} to the keyring...", user);
        let entry = Entry::new(KEYRING_SERVICE, user)?;
        entry.set_password(&serde_json::to_string(tokens)?)?;
        Ok(())
    }

    fn delete(&self, user: &str) -> Result<(), TokenStoreError> {
        let entry = Entry::new(KEYRING_SERVICE, user)?;
        match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(TokenStoreError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tokens() -> TokenSet {
        TokenSet {
            access_token: "1000.access".to_string(),
            refresh_token: Some("1000.refresh".to_string()),
            expires_in: Some(3600),
            api_domain: Some("https://www.zohoapis.com".to_string()),
            token_type: Some("Bearer".to_string()),
            obtained_at: None,
        }
    }

    #[test]
    fn file_store_round_trips_a_token_set() {
        let directory = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(directory.path().join("tokens.json"));

        assert!(store.get("crm@example.com").unwrap().is_none());

        let tokens = sample_tokens();
        store.put("crm@example.com", &tokens).unwrap();
        assert_eq!(store.get("crm@example.com").unwrap(), Some(tokens));
    }

    #[test]
    fn file_store_keeps_tokens_per_user() {
        let directory = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(directory.path().join("tokens.json"));

        let first = sample_tokens();
        let second = TokenSet {
            access_token: "1000.other".to_string(),
            ..sample_tokens()
        };
        store.put("first@example.com", &first).unwrap();
        store.put("second@example.com", &second).unwrap();

        assert_eq!(store.get("first@example.com").unwrap(), Some(first));
        assert_eq!(store.get("second@example.com").unwrap(), Some(second));
    }

    #[test]
    fn file_store_delete_removes_only_the_requested_user() {
        let directory = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(directory.path().join("tokens.json"));

        store.put("first@example.com", &sample_tokens()).unwrap();
        store.put("second@example.com", &sample_tokens()).unwrap();

        store.delete("first@example.com").unwrap();
        assert!(store.get("first@example.com").unwrap().is_none());
        assert!(store.get("second@example.com").unwrap().is_some());

        // deleting an absent user is not an error
        store.delete("first@example.com").unwrap();
    }

    #[test]
    fn file_store_creates_missing_parent_directories() {
        let directory = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(directory.path().join("nested/dir/tokens.json"));
        store.put("crm@example.com", &sample_tokens()).unwrap();
        assert!(store.get("crm@example.com").unwrap().is_some());
    }
}
