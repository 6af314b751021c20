//! In-memory credential record mirrored to persistent storage.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use vendorflow_core::traits::{EXPIRY_KEY, TOKEN_KEY, USER_KEY};
use vendorflow_core::{AccessToken, AuthResponse, CredentialStorage, Result, User};

/// Tokens are treated as expired this long before their nominal expiry.
pub const REFRESH_SKEW_MS: i64 = 5 * 60 * 1000;

pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A bearer token together with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: AccessToken,
    /// Epoch milliseconds.
    pub expires_at_ms: i64,
}

impl Credential {
    /// True once `now_ms` is within the refresh skew of the expiry.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms.saturating_sub(REFRESH_SKEW_MS)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expires_at_ms)
    }
}

/// The client's single credential record.
///
/// Every mutation is written to the backing [`CredentialStorage`] before the
/// method returns. Storage failures are logged and do not undo the in-memory
/// change.
pub struct CredentialStore {
    storage: Arc<dyn CredentialStorage>,
    current: RwLock<Option<Credential>>,
}

impl CredentialStore {
    /// Create an empty store. Call [`hydrate`](Self::hydrate) to load a
    /// persisted session.
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
        }
    }

    /// Load the credential from storage. Returns true when one was found.
    ///
    /// Entries without both a token and a parseable expiry are ignored.
    pub fn hydrate(&self) -> bool {
        let loaded = match self.read_persisted() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "Failed to load auth state from storage");
                None
            }
        };

        let found = loaded.is_some();
        if found {
            debug!("Loaded credential from storage");
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = loaded;
        found
    }

    fn read_persisted(&self) -> Result<Option<Credential>> {
        let token = self.storage.get(TOKEN_KEY)?;
        let expiry = self.storage.get(EXPIRY_KEY)?;

        let (Some(token), Some(expiry)) = (token, expiry) else {
            return Ok(None);
        };
        let Ok(expires_at_ms) = expiry.trim().parse::<i64>() else {
            warn!("Ignoring stored token with unreadable expiry");
            return Ok(None);
        };
        let Ok(token) = AccessToken::new(token) else {
            return Ok(None);
        };

        Ok(Some(Credential {
            token,
            expires_at_ms,
        }))
    }

    /// A snapshot of the current credential.
    pub fn current(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.current().map(|c| c.token)
    }

    /// Replace the credential with a token valid for `expires_in_secs`.
    pub fn set(&self, token: AccessToken, expires_in_secs: i64) -> Credential {
        let credential = Credential {
            token,
            expires_at_ms: now_ms().saturating_add(expires_in_secs.saturating_mul(1000)),
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());

        let mirrored = self
            .storage
            .set(TOKEN_KEY, credential.token.as_str())
            .and_then(|_| {
                self.storage
                    .set(EXPIRY_KEY, &credential.expires_at_ms.to_string())
            });
        if let Err(e) = mirrored {
            warn!(error = %e, "Failed to save auth state to storage");
        }

        credential
    }

    /// Store the token, expiry and (when present) profile of an
    /// authentication response. Fails when the response carries no token.
    pub fn store_auth(&self, auth: &AuthResponse) -> Result<Credential> {
        let token = AccessToken::new(auth.token().unwrap_or_default())?;
        let credential = self.set(token, auth.expires_in);
        if let Some(user) = auth.profile() {
            self.set_user(user);
        }
        Ok(credential)
    }

    pub fn set_user(&self, user: &User) {
        let saved = serde_json::to_string(user)
            .map_err(vendorflow_core::Error::from)
            .and_then(|json| self.storage.set(USER_KEY, &json));
        if let Err(e) = saved {
            warn!(error = %e, "Failed to save user data");
        }
    }

    /// The persisted user profile, if any.
    pub fn user(&self) -> Option<User> {
        let raw = match self.storage.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read user data");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable user data");
                None
            }
        }
    }

    /// Wipe the credential and profile from memory and storage.
    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;

        for key in [TOKEN_KEY, EXPIRY_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(error = %e, key, "Failed to clear auth state from storage");
            }
        }
    }

    /// True while a token is held and not within the refresh skew.
    pub fn is_authenticated(&self) -> bool {
        self.current()
            .map(|c| !c.is_expired(now_ms()))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let credential = self.current();
        f.debug_struct("CredentialStore")
            .field("authenticated", &credential.is_some())
            .field("expires_at_ms", &credential.map(|c| c.expires_at_ms))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendorflow_core::{MemoryStorage, UserRole};

    fn store() -> (Arc<MemoryStorage>, CredentialStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(storage.clone());
        (storage, store)
    }

    fn token(value: &str) -> AccessToken {
        AccessToken::new(value).unwrap()
    }

    #[test]
    fn skew_treats_near_expiry_as_expired() {
        let now = now_ms();
        let soon = Credential {
            token: token("a"),
            expires_at_ms: now + 4 * 60 * 1000,
        };
        let later = Credential {
            token: token("a"),
            expires_at_ms: now + 10 * 60 * 1000,
        };
        assert!(soon.is_expired(now));
        assert!(!later.is_expired(now));
    }

    #[test]
    fn set_mirrors_to_storage() {
        let (storage, store) = store();
        let credential = store.set(token("tok-1"), 900);

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert_eq!(
            storage.get(EXPIRY_KEY).unwrap(),
            Some(credential.expires_at_ms.to_string())
        );
        assert!(store.is_authenticated());
    }

    #[test]
    fn hydrate_restores_persisted_credential() {
        let (storage, first) = store();
        let stored = first.set(token("tok-1"), 900);

        let second = CredentialStore::new(storage);
        assert!(second.current().is_none());
        assert!(second.hydrate());
        assert_eq!(second.current(), Some(stored));
    }

    #[test]
    fn hydrate_requires_token_and_expiry() {
        let (storage, store) = store();
        storage.set(TOKEN_KEY, "tok-1").unwrap();
        assert!(!store.hydrate());

        storage.set(EXPIRY_KEY, "not-a-number").unwrap();
        assert!(!store.hydrate());

        storage.set(EXPIRY_KEY, "1700000000000").unwrap();
        assert!(store.hydrate());
    }

    #[test]
    fn clear_removes_every_entry() {
        let (storage, store) = store();
        store.set(token("tok-1"), 900);
        store.set_user(&User {
            id: "u1".into(),
            email: "ops@acme.test".into(),
            first_name: None,
            last_name: None,
            role: UserRole::Admin,
            company_name: None,
            tenant_id: None,
            status: None,
            is_active: None,
            email_verified: None,
            extra: Default::default(),
        });
        assert_eq!(storage.len(), 3);
        assert_eq!(store.user().map(|u| u.id), Some("u1".to_string()));

        store.clear();
        assert!(storage.is_empty());
        assert!(store.current().is_none());
        assert!(store.user().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn huge_lifetimes_saturate() {
        let (storage, store) = store();
        let credential = store.set(token("tok-1"), i64::MAX / 1000);
        assert_eq!(credential.expires_at_ms, i64::MAX);
        assert!(!credential.is_expired(now_ms()));

        store.set(token("tok-2"), i64::MIN);
        assert!(!store.is_authenticated());

        storage.set(EXPIRY_KEY, &i64::MIN.to_string()).unwrap();
        assert!(store.hydrate());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn store_auth_without_token_stores_nothing() {
        let (storage, store) = store();
        let auth: AuthResponse = serde_json::from_value(serde_json::json!({
            "requiresOtp": true,
            "user": {"email": "new@acme.test"}
        }))
        .unwrap();
        assert!(store.store_auth(&auth).is_err());
        assert!(storage.is_empty());
    }

    #[test]
    fn store_auth_rejects_empty_token() {
        let (storage, store) = store();
        let auth: AuthResponse =
            serde_json::from_value(serde_json::json!({"access_token": ""})).unwrap();
        assert!(store.store_auth(&auth).is_err());
        assert!(storage.is_empty());
    }
}
