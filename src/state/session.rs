//! Process-wide session record and its mutation API.
//!
//! SYSTEM CONTEXT
//! ==============
//! The record is hydrated once from storage when the [`Session`] is opened
//! and is then changed only through `set_auth`, `clear_auth`,
//! `enter_guest_mode`, and `exit_guest_mode`. Each operation updates memory
//! and storage in one synchronous step, so readers never observe a half
//! applied change.
//!
//! STORAGE LAYOUT
//! ==============
//! - durable `<app>.auth`: `{token, user, expiresAt, redirectUrl}` JSON
//! - transient `<app>.guest-mode`: `"1"` while guest mode is active

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::auth::{self, AuthFacts};
use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::net::types::{AuthUser, LoginResponse, Role};
use crate::storage::{KeyValueStore, PersistentStore};

const GUEST_FLAG_VALUE: &str = "1";

/// In-memory view of the current user's authentication status.
///
/// `token`, `user`, and `expires_at` are either all present or all absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionRecord {
    pub token: Option<String>,
    pub user: Option<AuthUser>,
    /// Absolute expiry in milliseconds since the Unix epoch.
    pub expires_at: Option<i64>,
    /// Post-login landing hint from the server. Advisory only.
    pub redirect_url: Option<String>,
    pub guest: bool,
}

/// Storage keys for both scopes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub auth: String,
    pub guest: String,
}

impl StorageKeys {
    #[must_use]
    pub fn for_app(app_key: &str) -> Self {
        Self { auth: format!("{app_key}.auth"), guest: format!("{app_key}.guest-mode") }
    }
}

impl From<&ClientConfig> for StorageKeys {
    fn from(config: &ClientConfig) -> Self {
        Self { auth: config.auth_storage_key(), guest: config.guest_storage_key() }
    }
}

/// Durable payload shape.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAuth {
    token: String,
    user: AuthUser,
    expires_at: i64,
    #[serde(default)]
    redirect_url: Option<String>,
}

pub struct Session {
    record: SessionRecord,
    durable: PersistentStore,
    transient: PersistentStore,
    keys: StorageKeys,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("record", &self.record)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open the session over the given storage scopes and hydrate it.
    pub fn open(
        durable: Arc<dyn KeyValueStore>,
        transient: Arc<dyn KeyValueStore>,
        keys: StorageKeys,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut session = Self {
            record: SessionRecord::default(),
            durable: PersistentStore::new(durable),
            transient: PersistentStore::new(transient),
            keys,
            clock,
        };
        session.hydrate();
        session
    }

    fn hydrate(&mut self) {
        if let Some(stored) = self.durable.read_json::<StoredAuth>(&self.keys.auth) {
            let now = self.clock.now_ms();
            if !stored.token.is_empty() && stored.expires_at > now {
                tracing::debug!(user_id = stored.user.id, expires_at = stored.expires_at, "restored stored session");
                self.record.token = Some(stored.token);
                self.record.user = Some(stored.user);
                self.record.expires_at = Some(stored.expires_at);
                self.record.redirect_url = stored.redirect_url;
            } else {
                tracing::info!(expires_at = stored.expires_at, "discarding expired stored session");
                self.durable.remove(&self.keys.auth);
            }
        }

        self.record.guest = self.transient.read_raw(&self.keys.guest).as_deref() == Some(GUEST_FLAG_VALUE);
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Adopt a login result. Clears guest mode.
    pub fn set_auth(&mut self, login: &LoginResponse) {
        let expires_at = login.expires_at();
        self.record.token = Some(login.token.clone());
        self.record.user = Some(login.user.clone());
        self.record.expires_at = Some(expires_at);
        self.record.redirect_url.clone_from(&login.redirect_url);
        self.persist_guest(false);

        let stored = StoredAuth {
            token: login.token.clone(),
            user: login.user.clone(),
            expires_at,
            redirect_url: login.redirect_url.clone(),
        };
        self.durable.write_json(&self.keys.auth, &stored);
        tracing::info!(user_id = login.user.id, role = %login.user.role(), expires_at, "session established");
    }

    /// Drop the login and guest mode. Idempotent.
    pub fn clear_auth(&mut self) {
        self.reset_auth_fields();
        self.persist_guest(false);
        self.durable.remove(&self.keys.auth);
        tracing::info!("session cleared");
    }

    /// Switch to anonymous guest browsing, discarding any login.
    pub fn enter_guest_mode(&mut self) {
        self.durable.remove(&self.keys.auth);
        self.reset_auth_fields();
        self.persist_guest(true);
        tracing::info!("entered guest mode");
    }

    /// Leave guest mode. Auth fields are left untouched.
    pub fn exit_guest_mode(&mut self) {
        if !self.record.guest {
            return;
        }
        self.persist_guest(false);
        tracing::info!("left guest mode");
    }

    fn reset_auth_fields(&mut self) {
        self.record.token = None;
        self.record.user = None;
        self.record.expires_at = None;
        self.record.redirect_url = None;
    }

    fn persist_guest(&mut self, enabled: bool) {
        self.record.guest = enabled;
        if enabled {
            self.transient.write_raw(&self.keys.guest, GUEST_FLAG_VALUE);
        } else {
            self.transient.remove(&self.keys.guest);
        }
    }

    // =========================================================================
    // DERIVED FACTS
    // =========================================================================

    #[must_use]
    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        self.record.user.as_ref()
    }

    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        auth::is_authenticated(&self.record, self.now_ms())
    }

    /// The bearer token while the login is still valid.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        auth::effective_token(&self.record, self.now_ms())
    }

    #[must_use]
    pub fn is_guest_session(&self) -> bool {
        auth::is_guest_session(&self.record, self.now_ms())
    }

    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        auth::has_role(&self.record, role)
    }

    #[must_use]
    pub fn facts(&self) -> AuthFacts {
        AuthFacts::derive(&self.record, self.now_ms())
    }
}

/// Shared handle to the single process-wide [`Session`].
///
/// Locks are only ever held for one synchronous operation and never across
/// an `.await`.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { inner: Arc::new(Mutex::new(session)) }
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
