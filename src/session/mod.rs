//! # Session handling
//!
//! The session moves between three states:
//!
//! - **Anonymous**: no token, no user
//! - **Authenticating**: a login or registration exchange is in flight
//! - **Authenticated**: token and user are both present
//!
//! [`SessionHandle`] is the shared, cloneable view of that state. The HTTP client reads
//! the bearer token from it for every request and expires it when the backend answers
//! 401. [`SessionManager`] drives the transitions and is the only writer of durable
//! storage.
//!
//! ## Modules
//!
//! - [`manager`] - login, registration, logout, restore and availability checks
//! - [`storage`] - durable key-value storage with expiry metadata

pub mod manager;
pub mod storage;

pub use manager::SessionManager;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};

use std::sync::{Arc, Mutex, MutexGuard};

use crate::client::types::User;
use storage::{TOKEN_KEY, USER_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Default)]
struct SessionInner {
    token: Option<String>,
    user: Option<User>,
    exchanges_in_flight: usize,
}

/// Shared session state plus the storage it persists to.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionInner>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionHandle {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner::default())),
            storage,
        }
    }

    fn inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SessionState {
        let inner = self.inner();
        if inner.exchanges_in_flight > 0 {
            SessionState::Authenticating
        } else if inner.token.is_some() && inner.user.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        let inner = self.inner();
        inner.token.is_some() && inner.user.is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner().user.clone()
    }

    /// Token to attach as `Authorization: Bearer`, if any.
    pub fn bearer_token(&self) -> Option<String> {
        self.inner().token.clone()
    }

    pub fn token_preview(&self) -> Option<String> {
        self.inner()
            .token
            .as_deref()
            .map(|t| format!("{}...", t.chars().take(10).collect::<String>()))
    }

    pub(crate) fn storage(&self) -> &dyn SessionStorage {
        self.storage.as_ref()
    }

    /// Mark an exchange as started. The returned guard ends it when dropped.
    pub(crate) fn begin_exchange(&self, drop_credential: bool) -> ExchangeGuard<'_> {
        let mut inner = self.inner();
        inner.exchanges_in_flight += 1;
        if drop_credential {
            inner.token = None;
            inner.user = None;
        }
        ExchangeGuard { handle: self }
    }

    /// Install a credential in memory and persist it.
    ///
    /// Runs on the async login path. The storage write is synchronous and small.
    pub(crate) fn establish(&self, token: String, user: User) {
        let serialized_user = serde_json::to_string(&user);
        {
            let mut inner = self.inner();
            inner.token = Some(token.clone());
            inner.user = Some(user);
        }

        let persisted = serialized_user
            .map_err(anyhow::Error::from)
            .and_then(|user_json| {
                self.storage.set(TOKEN_KEY, &token)?;
                self.storage.set(USER_KEY, &user_json)
            });
        if let Err(e) = persisted {
            tracing::warn!("Failed to persist session, it will not survive a restart: {:#}", e);
        }
    }

    /// Install a credential read back from storage, without writing it again.
    pub(crate) fn adopt(&self, token: String, user: User) {
        let mut inner = self.inner();
        inner.token = Some(token);
        inner.user = Some(user);
    }

    /// Drop the credential and wipe durable storage.
    pub(crate) fn clear(&self) {
        {
            let mut inner = self.inner();
            inner.token = None;
            inner.user = None;
        }
        self.clear_storage();
    }

    /// Synchronous, like [`SessionHandle::establish`]; also reached from the 401 path.
    pub(crate) fn clear_storage(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to clear stored session entry {}: {:#}", key, e);
            }
        }
    }

    /// Called by the HTTP client when the backend rejects the credential.
    pub fn expire(&self) {
        if self.bearer_token().is_some() {
            tracing::info!("Session rejected by the server (401), logging out");
        }
        self.clear();
    }
}

pub(crate) struct ExchangeGuard<'a> {
    handle: &'a SessionHandle,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.handle.inner();
        inner.exchanges_in_flight = inner.exchanges_in_flight.saturating_sub(1);
    }
}
