//! Session transitions: login, registration, logout and restore.

use crate::client::{
    auth::AuthService,
    error::ApiResult,
    types::{LoginCredentials, RegisterData, User},
};
use crate::session::{
    storage::{TOKEN_KEY, USER_KEY},
    SessionHandle, SessionState,
};

pub struct SessionManager {
    handle: SessionHandle,
    auth: AuthService,
}

impl SessionManager {
    pub fn new(handle: SessionHandle, auth: AuthService) -> Self {
        Self { handle, auth }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.handle.is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.handle.current_user()
    }

    pub fn display_name(&self) -> String {
        self.current_user().map(|u| u.display_name()).unwrap_or_default()
    }

    pub fn initials(&self) -> String {
        self.current_user().map(|u| u.initials()).unwrap_or_default()
    }

    /// Log in and persist the session for 7 days.
    ///
    /// The previous credential is dropped as soon as the exchange starts; on failure the
    /// session ends up anonymous with nothing persisted.
    pub async fn login(&self, credentials: LoginCredentials) -> ApiResult<User> {
        let _exchange = self.handle.begin_exchange(true);

        match self.auth.login(&credentials).await {
            Ok(response) => {
                let user = response.user.clone();
                self.handle.establish(response.token, response.user);
                tracing::info!(
                    "Login successful, welcome back {} (token {})",
                    user.display_name(),
                    self.handle.token_preview().unwrap_or_default()
                );
                Ok(user)
            }
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                self.handle.clear();
                Err(e)
            }
        }
    }

    /// Create an account. The session is left as it was.
    pub async fn register(&self, data: RegisterData) -> ApiResult<User> {
        let _exchange = self.handle.begin_exchange(false);

        match self.auth.register(&data).await {
            Ok(user) => {
                tracing::info!("Registration successful for {}", user.username);
                Ok(user)
            }
            Err(e) => {
                tracing::error!("Registration failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.handle.clear();
        tracing::info!("Logged out");
    }

    /// Restore a persisted session at startup. Returns whether a session was restored.
    ///
    /// Malformed or partial data is discarded; this never fails.
    pub fn restore(&self) -> bool {
        let storage = self.handle.storage();
        let token = storage.get(TOKEN_KEY);
        let user = storage.get(USER_KEY);

        match (token, user) {
            (Ok(Some(token)), Ok(Some(raw_user))) if !token.trim().is_empty() => {
                match serde_json::from_str::<User>(&raw_user) {
                    Ok(user) => {
                        tracing::info!("Session restored for {}", user.display_name());
                        self.handle.adopt(token, user);
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Discarding stored session, user record is malformed: {}",
                            e
                        );
                        self.handle.clear_storage();
                        false
                    }
                }
            }
            (Ok(None), Ok(None)) => {
                tracing::debug!("No stored session");
                false
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Discarding unreadable stored session: {:#}", e);
                self.handle.clear_storage();
                false
            }
            _ => {
                tracing::warn!("Discarding incomplete stored session");
                self.handle.clear_storage();
                false
            }
        }
    }

    /// `true` when nobody has the username yet. Any failure reads as unavailable.
    pub async fn username_available(&self, username: &str) -> bool {
        match self.auth.username_exists(username).await {
            Ok(exists) => !exists,
            Err(e) => {
                tracing::warn!("Error checking username availability: {}", e);
                false
            }
        }
    }

    /// `true` when the email is not registered yet. Any failure reads as unavailable.
    pub async fn email_available(&self, email: &str) -> bool {
        match self.auth.email_exists(email).await {
            Ok(exists) => !exists,
            Err(e) => {
                tracing::warn!("Error checking email availability: {}", e);
                false
            }
        }
    }
}
