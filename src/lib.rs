//! # Recipe Vault MCP Library
//!
//! This library provides a client for Recipe Vault (a recipe sharing application) and
//! exposes it through the Model Context Protocol (MCP).
//!
//! ## Client Module
//!
//! The [`client`] module talks to the Recipe Vault REST API: authentication, recipe
//! CRUD and image storage, with every failure normalized into [`client::ApiError`].
//!
//! ## Session and Recipes
//!
//! [`session`] keeps the login state and persists it between runs. [`ingredients`]
//! converts between ingredient strings and structured ingredients, [`filter`] handles
//! search and pagination, and [`store`] holds the fetched recipes.
//!
//! ## Server Module
//!
//! The [`server`] module implements an MCP server over a shared [`RecipeVault`], with
//! [`guards`] deciding which tools a caller may use.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use recipe_vault_mcp::{RecipeVault, RecipeVaultMcpServer, VaultConfig};
//! use recipe_vault_mcp::session::MemorySessionStorage;
//!
//! # fn example() -> anyhow::Result<()> {
//! let vault = Arc::new(RecipeVault::new(
//!     VaultConfig::with_base_url("http://localhost:9000/api"),
//!     Arc::new(MemorySessionStorage::new()),
//! )?);
//!
//! let server = RecipeVaultMcpServer::new(vault);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod filter;
pub mod guards;
pub mod ingredients;
pub mod server;
pub mod session;
pub mod store;

pub use app::RecipeVault;
pub use client::RecipeVaultClient;
pub use config::VaultConfig;
pub use server::RecipeVaultMcpServer;
