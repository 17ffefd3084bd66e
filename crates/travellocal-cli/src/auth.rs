//! Credential persistence in the system keychain.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use travellocal_core::session::{CredentialStore, Session};
use travellocal_core::{Error, Result};

const KEYRING_SERVICE_NAME: &str = "travellocal-cli";

/// One keychain entry per credential key, all under one service name.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::with_service(KEYRING_SERVICE_NAME)
    }
}

impl KeyringCredentialStore {
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(test)]
    fn test_key(&self, key: &str) -> String {
        format!("{}:{key}", self.service)
    }

    #[cfg(not(test))]
    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).map_err(|error| Error::CredentialStore(error.to_string()))
    }
}

impl CredentialStore for KeyringCredentialStore {
    #[cfg(not(test))]
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::CredentialStore(error.to_string())),
        }
    }

    #[cfg(test)]
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        Ok(guard.get(&self.test_key(key)).cloned())
    }

    #[cfg(not(test))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|error| Error::CredentialStore(error.to_string()))
    }

    #[cfg(test)]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        guard.insert(self.test_key(key), value.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::CredentialStore(error.to_string())),
        }
    }

    #[cfg(test)]
    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        guard.remove(&self.test_key(key));
        Ok(())
    }
}

pub fn keychain_session() -> Session<KeyringCredentialStore> {
    Session::new(KeyringCredentialStore::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_are_isolated_by_service() {
        let first = KeyringCredentialStore::with_service("auth-test-a");
        let second = KeyringCredentialStore::with_service("auth-test-b");
        first.set("accessToken", "a").unwrap();

        assert_eq!(first.get("accessToken").unwrap().as_deref(), Some("a"));
        assert_eq!(second.get("accessToken").unwrap(), None);

        first.remove("accessToken").unwrap();
        first.remove("accessToken").unwrap();
        assert_eq!(first.get("accessToken").unwrap(), None);
    }
}
