//! Session Store
//!
//! Owns the in-memory session record and mirrors it into a [`SessionStorage`].
//! The record is read by every outgoing request and written only by
//! restore, login and logout.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::storage::{SessionStorage, PROFILE_KEY, TOKEN_KEY};
use crate::error::Result;

/// Administrator profile returned by the backend at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserProfile,
}

/// An authenticated session. Credential and profile only exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: String,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub session: Option<Session>,
    /// A login call is outstanding.
    pub loading: bool,
    /// Message from the last failed login, cleared by the next attempt.
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Box<dyn SessionStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    /// Creates an unauthenticated store; call [`restore`](Self::restore) to load persisted state.
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            storage: Box::new(storage),
        }
    }

    /// Creates a store and immediately restores it.
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let store = Self::new(storage);
        store.restore();
        store
    }

    /// Loads the persisted credential and profile. Absent or unreadable data
    /// leaves the session unauthenticated; this never fails.
    pub fn restore(&self) -> bool {
        let token = self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let profile = self
            .storage
            .get(PROFILE_KEY)
            .and_then(|raw| match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable stored profile: {}", e);
                    None
                }
            });

        let session = match (token, profile) {
            (Some(credential), Some(profile)) => Some(Session { credential, profile }),
            _ => None,
        };

        let restored = session.is_some();
        match &session {
            Some(s) => tracing::info!("Restored session for {}", s.profile.username),
            None => tracing::debug!("No stored session"),
        }

        let mut state = self.write();
        state.session = session;
        state.loading = false;
        restored
    }

    /// Marks a login call as outstanding.
    pub fn begin_login(&self) {
        let mut state = self.write();
        state.loading = true;
        state.error = None;
    }

    /// Persists a successful login and marks the session authenticated.
    pub fn complete_login(&self, response: LoginResponse) -> Result<UserProfile> {
        let persisted = self.persist(&response);

        let mut state = self.write();
        state.loading = false;
        match persisted {
            Ok(()) => {
                tracing::info!("Logged in as {}", response.user.username);
                let profile = response.user.clone();
                state.session = Some(Session {
                    credential: response.access_token,
                    profile: response.user,
                });
                state.error = None;
                Ok(profile)
            }
            Err(e) => {
                state.session = None;
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Records a failed login; the session stays unauthenticated.
    pub fn fail_login(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("Login failed: {}", message);
        let mut state = self.write();
        state.loading = false;
        state.session = None;
        state.error = Some(message);
    }

    /// Clears the persisted entries and the in-memory session. Never fails;
    /// storage errors are logged.
    pub fn logout(&self) {
        for key in [TOKEN_KEY, PROFILE_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to clear stored {}: {}", key, e);
            }
        }

        let mut state = self.write();
        if let Some(session) = state.session.take() {
            tracing::info!("Logged out {}", session.profile.username);
        }
        state.loading = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn credential(&self) -> Option<String> {
        self.read().session.as_ref().map(|s| s.credential.clone())
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.read().session.as_ref().map(|s| s.profile.clone())
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    fn persist(&self, response: &LoginResponse) -> Result<()> {
        let profile = serde_json::to_string(&response.user)
            .map_err(|e| crate::error::AdminError::Storage(e.to_string()))?;
        self.storage.set(TOKEN_KEY, &response.access_token)?;
        if let Err(e) = self.storage.set(PROFILE_KEY, &profile) {
            // never leave a credential without its profile
            if let Err(cleanup) = self.storage.remove(TOKEN_KEY) {
                tracing::warn!("Failed to clear stored {}: {}", TOKEN_KEY, cleanup);
            }
            return Err(e);
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
