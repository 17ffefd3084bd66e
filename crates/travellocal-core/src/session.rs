//! Access-token storage and the session surface every request reads from.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::text::non_blank;

pub const KEY_ACCESS_TOKEN: &str = "accessToken";
pub const KEY_CURRENT_USER_ID: &str = "currentUserId";
pub const KEY_CURRENT_USER_NAME: &str = "currentUserName";
const KEY_SCHEDULE_UNLOCKED_PREFIX: &str = "schedule_unlocked_";

/// Plain string key/value persistence. No encryption, no expiry.
pub trait CredentialStore: Clone + Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store for tests and embedders without a platform keychain.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .entries
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Display name and id of the signed-in user, cached between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedIdentity {
    pub user_id: String,
    pub user_name: String,
}

/// Single read/write surface for credentials.
///
/// Nothing here caches the token in memory: each call goes to the store, so
/// clearing the token affects the very next request.
#[derive(Clone)]
pub struct Session<S: CredentialStore> {
    store: S,
}

impl<S: CredentialStore> fmt::Debug for Session<S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("store", &"[REDACTED]")
            .finish()
    }
}

impl<S: CredentialStore> Session<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(non_blank(self.store.get(KEY_ACCESS_TOKEN)?).map(strip_bearer_prefix))
    }

    /// Stores a token as received, dropping any `Bearer ` prefix.
    pub fn store_access_token(&self, raw: &str) -> Result<()> {
        let token = strip_bearer_prefix(raw.trim().to_string());
        if token.is_empty() {
            return Err(Error::InvalidInput(
                "access token must not be empty".to_string(),
            ));
        }
        self.store.set(KEY_ACCESS_TOKEN, &token)
    }

    pub fn is_signed_in(&self) -> Result<bool> {
        Ok(self.access_token()?.is_some())
    }

    /// Removes the token and the cached identity.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(KEY_ACCESS_TOKEN)?;
        self.store.remove(KEY_CURRENT_USER_ID)?;
        self.store.remove(KEY_CURRENT_USER_NAME)
    }

    pub fn cached_identity(&self) -> Result<Option<CachedIdentity>> {
        let user_id = non_blank(self.store.get(KEY_CURRENT_USER_ID)?);
        let user_name = non_blank(self.store.get(KEY_CURRENT_USER_NAME)?);
        Ok(match (user_id, user_name) {
            (Some(user_id), Some(user_name)) => Some(CachedIdentity { user_id, user_name }),
            _ => None,
        })
    }

    pub fn store_identity(&self, identity: &CachedIdentity) -> Result<()> {
        self.store.set(KEY_CURRENT_USER_ID, &identity.user_id)?;
        self.store.set(KEY_CURRENT_USER_NAME, &identity.user_name)
    }

    /// The `sub` claim of the stored token, for ownership checks in views.
    ///
    /// The token is decoded, never verified. Any malformed token yields `None`.
    pub fn token_subject(&self) -> Result<Option<String>> {
        Ok(self
            .access_token()?
            .and_then(|token| decode_token_subject(&token)))
    }

    /// Current user id: cached identity first, then the token subject.
    pub fn current_user_id(&self) -> Result<Option<String>> {
        if let Some(identity) = self.cached_identity()? {
            return Ok(Some(identity.user_id));
        }
        self.token_subject()
    }

    pub fn schedule_unlocked(&self, program_id: i64) -> Result<bool> {
        Ok(self
            .store
            .get(&schedule_unlocked_key(program_id))?
            .is_some_and(|value| value.trim() == "true"))
    }

    pub fn store_schedule_unlocked(&self, program_id: i64, unlocked: bool) -> Result<()> {
        self.store
            .set(&schedule_unlocked_key(program_id), &unlocked.to_string())
    }
}

fn schedule_unlocked_key(program_id: i64) -> String {
    format!("{KEY_SCHEDULE_UNLOCKED_PREFIX}{program_id}")
}

fn strip_bearer_prefix(token: String) -> String {
    match token.strip_prefix("Bearer ") {
        Some(stripped) => stripped.trim().to_string(),
        None => token,
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Option<serde_json::Value>,
}

fn decode_token_subject(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims = serde_json::from_slice::<TokenClaims>(&bytes).ok()?;
    match claims.sub? {
        serde_json::Value::String(subject) => non_blank(Some(subject)),
        serde_json::Value::Number(subject) => Some(subject.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.signature",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn store_access_token_strips_bearer_prefix() {
        let session = Session::new(MemoryCredentialStore::default());
        session.store_access_token("Bearer abc.def.ghi").unwrap();
        assert_eq!(session.access_token().unwrap().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_token_is_rejected() {
        let session = Session::new(MemoryCredentialStore::default());
        assert!(session.store_access_token("   ").is_err());
        assert!(!session.is_signed_in().unwrap());
    }

    #[test]
    fn clear_takes_effect_on_next_read() {
        let store = MemoryCredentialStore::default();
        let session = Session::new(store.clone());
        session.store_access_token("token").unwrap();
        let other_handle = Session::new(store);
        other_handle.clear().unwrap();
        assert_eq!(session.access_token().unwrap(), None);
    }

    #[test]
    fn token_subject_reads_string_and_numeric_claims() {
        let session = Session::new(MemoryCredentialStore::default());
        session
            .store_access_token(&token_with_payload(r#"{"sub":"42","exp":1}"#))
            .unwrap();
        assert_eq!(session.token_subject().unwrap().as_deref(), Some("42"));

        session
            .store_access_token(&token_with_payload(r#"{"sub":7}"#))
            .unwrap();
        assert_eq!(session.token_subject().unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn malformed_token_has_no_subject() {
        let session = Session::new(MemoryCredentialStore::default());
        session.store_access_token("not-a-jwt").unwrap();
        assert_eq!(session.token_subject().unwrap(), None);
    }

    #[test]
    fn cached_identity_requires_both_keys() {
        let store = MemoryCredentialStore::default();
        let session = Session::new(store.clone());
        store.set(KEY_CURRENT_USER_ID, "12").unwrap();
        assert_eq!(session.cached_identity().unwrap(), None);

        session
            .store_identity(&CachedIdentity {
                user_id: "12".to_string(),
                user_name: "여행자".to_string(),
            })
            .unwrap();
        assert_eq!(session.current_user_id().unwrap().as_deref(), Some("12"));
    }

    #[test]
    fn schedule_unlock_flag_roundtrip() {
        let session = Session::new(MemoryCredentialStore::default());
        assert!(!session.schedule_unlocked(3).unwrap());
        session.store_schedule_unlocked(3, true).unwrap();
        assert!(session.schedule_unlocked(3).unwrap());
        assert!(!session.schedule_unlocked(4).unwrap());
    }

    #[test]
    fn session_debug_redacts_store() {
        let session = Session::new(MemoryCredentialStore::default());
        session.store_access_token("secret-access-token").unwrap();
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-access-token"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
