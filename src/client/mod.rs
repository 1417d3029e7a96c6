//! # Recipe Vault HTTP Client
//!
//! This module provides a typed client for the Recipe Vault REST API: authentication,
//! recipe CRUD and image storage.
//!
//! ## Modules
//!
//! - [`client`] - Shared HTTP layer (base URL, timeouts, bearer credential, error normalization)
//! - [`auth`] - Login, registration and availability checks
//! - [`recipes`] - Recipe CRUD with wire ↔ display mapping
//! - [`images`] - Image upload and deletion
//! - [`error`] - The normalized [`ApiError`]
//! - [`types`] - Wire and display types
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use recipe_vault_mcp::client::{RecipeService, RecipeVaultClient};
//! use recipe_vault_mcp::config::VaultConfig;
//! use recipe_vault_mcp::session::{MemorySessionStorage, SessionHandle};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = SessionHandle::new(Arc::new(MemorySessionStorage::new()));
//! let client = RecipeVaultClient::new(&VaultConfig::default(), session)?;
//!
//! let recipes = RecipeService::new(client).list_all().await?;
//! println!("Found {} recipes", recipes.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
#[allow(clippy::module_inception)]
pub mod client;
pub mod error;
pub mod images;
pub mod recipes;
pub mod types;

pub use auth::AuthService;
pub use client::RecipeVaultClient;
pub use error::{ApiError, ApiResult};
pub use images::ImageService;
pub use recipes::RecipeService;
pub use types::*;
