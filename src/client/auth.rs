//! Authentication endpoints of the Recipe Vault API.
//!
//! These are plain request/response wrappers. Session state (storing the token,
//! attaching it to later requests) lives in [`crate::session::SessionManager`].

use crate::client::{
    client::RecipeVaultClient,
    error::ApiResult,
    types::{AuthResponse, LoginCredentials, RegisterData, User},
};

#[derive(Clone)]
pub struct AuthService {
    client: RecipeVaultClient,
}

impl AuthService {
    pub fn new(client: RecipeVaultClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a bearer token and the user profile.
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthResponse> {
        tracing::info!("Attempting login for: {}", credentials.username_or_email);
        self.client.post("/auth/login", credentials).await
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, data: &RegisterData) -> ApiResult<User> {
        tracing::info!("Registering new account: {}", data.username);
        self.client.post("/auth/register", data).await
    }

    /// Whether the username is already taken.
    pub async fn username_exists(&self, username: &str) -> ApiResult<bool> {
        let endpoint = format!("/auth/check-username?username={}", urlencoding::encode(username));
        self.client.get(&endpoint).await
    }

    /// Whether the email is already registered.
    pub async fn email_exists(&self, email: &str) -> ApiResult<bool> {
        let endpoint = format!("/auth/check-email?email={}", urlencoding::encode(email));
        self.client.get(&endpoint).await
    }
}
