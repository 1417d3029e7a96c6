//! Runtime configuration read from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::client::types::LoginCredentials;
use crate::filter::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "http://localhost:9000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_UPLOAD_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SESSION_FILE: &str = ".recipe_vault_session.json";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";

#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Base URL of the REST API, without trailing slash
    pub api_base_url: String,
    /// Timeout for ordinary API calls
    pub request_timeout: Duration,
    /// Timeout for image uploads
    pub upload_timeout: Duration,
    /// Where the session is persisted between runs
    pub session_file: PathBuf,
    pub page_size: usize,
    /// Address the MCP SSE server binds to
    pub bind_addr: String,
    /// Credentials used to log in at startup when no session could be restored
    pub credentials: Option<LoginCredentials>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            upload_timeout: Duration::from_millis(DEFAULT_UPLOAD_TIMEOUT_MS),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            page_size: DEFAULT_PAGE_SIZE,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            credentials: None,
        }
    }
}

impl VaultConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let credentials = match (
            env::var("RECIPE_VAULT_USERNAME").ok().filter(|v| !v.is_empty()),
            env::var("RECIPE_VAULT_PASSWORD").ok(),
        ) {
            (Some(username_or_email), Some(password)) => Some(LoginCredentials {
                username_or_email,
                password,
            }),
            _ => None,
        };

        let config = Self {
            api_base_url: normalize_base_url(&env_or("RECIPE_VAULT_API_URL", DEFAULT_API_URL)),
            request_timeout: Duration::from_millis(
                env_or("RECIPE_VAULT_TIMEOUT_MS", &DEFAULT_TIMEOUT_MS.to_string())
                    .parse()
                    .context("RECIPE_VAULT_TIMEOUT_MS must be a number of milliseconds")?,
            ),
            upload_timeout: Duration::from_millis(
                env_or("RECIPE_VAULT_UPLOAD_TIMEOUT_MS", &DEFAULT_UPLOAD_TIMEOUT_MS.to_string())
                    .parse()
                    .context("RECIPE_VAULT_UPLOAD_TIMEOUT_MS must be a number of milliseconds")?,
            ),
            session_file: PathBuf::from(env_or("RECIPE_VAULT_SESSION_FILE", DEFAULT_SESSION_FILE)),
            page_size: env_or("RECIPE_VAULT_PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string())
                .parse()
                .context("RECIPE_VAULT_PAGE_SIZE must be a positive number")?,
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            credentials,
        };

        config.validate()?;
        Ok(config)
    }

    /// Default configuration pointed at another API, mainly for tests.
    pub fn with_base_url(api_base_url: impl AsRef<str>) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url.as_ref()),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            anyhow::bail!("RECIPE_VAULT_API_URL cannot be empty");
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            anyhow::bail!("RECIPE_VAULT_API_URL must start with http:// or https://");
        }
        if self.request_timeout.is_zero() || self.upload_timeout.is_zero() {
            anyhow::bail!("Request timeouts must be greater than zero");
        }
        if self.page_size == 0 {
            anyhow::bail!("RECIPE_VAULT_PAGE_SIZE must be greater than zero");
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        tracing::debug!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
